// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access requests from external callers (websites).
//!
//! An [`ExternalAccessRequest`] is unauthenticated input: a website asking
//! for a scoped session. It is only ever converted into a persisted session
//! while the vault is unlocked, after validation here.

use serde::{Deserialize, Serialize};

use crate::domain::account::AccountReference;
use crate::domain::origin::OriginReference;
use crate::domain::permission::Permission;
use crate::error::VaultError;

/// A website's request for a scoped session.
///
/// `max_age` of zero is not "never expires" here; the teller substitutes its
/// configured default lifetime so external sessions always expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAccessRequest {
    permissions: Vec<Permission>,
    max_age: u64,
    origin: OriginReference,
    accounts: Vec<AccountReference>,
}

impl ExternalAccessRequest {
    pub fn new(
        permissions: Vec<Permission>,
        max_age: u64,
        origin: OriginReference,
        accounts: Vec<AccountReference>,
    ) -> Self {
        Self {
            permissions,
            max_age,
            origin,
            accounts,
        }
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    pub fn origin(&self) -> &OriginReference {
        &self.origin
    }

    pub fn accounts(&self) -> &[AccountReference] {
        &self.accounts
    }

    /// Reject structurally useless requests before any session is minted.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.permissions.is_empty() {
            return Err(VaultError::InvalidRequest(
                "External access request must carry at least one permission".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::permission::{PermissionsBuilder, Resource};

    fn read_accounts() -> Vec<Permission> {
        PermissionsBuilder::new()
            .for_resource(Resource::Account)
            .allow("read")
            .on_any()
            .build()
    }

    #[test]
    fn request_with_permissions_is_valid() {
        let request = ExternalAccessRequest::new(
            read_accounts(),
            6000,
            OriginReference::new("https://example.com").unwrap(),
            Vec::new(),
        );
        assert!(request.validate().is_ok());
    }

    #[test]
    fn request_without_permissions_is_rejected() {
        let request = ExternalAccessRequest::new(
            Vec::new(),
            6000,
            OriginReference::new("https://example.com").unwrap(),
            Vec::new(),
        );
        assert!(matches!(
            request.validate(),
            Err(VaultError::InvalidRequest(_))
        ));
    }

    #[test]
    fn deserializes_from_a_website_message() {
        let json = r#"{
            "permissions": [
                {"resource": "account", "action": "read", "identities": ["*"]}
            ],
            "max_age": 6000,
            "origin": "https://example.com/connect",
            "accounts": []
        }"#;

        let request: ExternalAccessRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.origin().value(), "https://example.com");
        assert_eq!(request.max_age(), 6000);
        assert!(request.validate().is_ok());
    }
}
