// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session records and their validity rules.
//!
//! Two kinds of session exist, distinguished by data rather than by type:
//! the owner session issued on unlock (no origin, `max_age = 0`, unrestricted
//! grants over every resource) and external sessions issued to websites
//! (origin, bounded age, scoped grants). Persisted sessions are append-only;
//! revocation stamps `invalidated_at` instead of deleting the record, so the
//! session history survives for audit.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::origin::OriginReference;
use crate::domain::permission::{Permission, PermissionsBuilder, Resource};

/// A capability grant to a caller, persisted by id.
///
/// Expiry is evaluated lazily against the clock the caller supplies; there is
/// no background timer. A `max_age` of zero means the session never expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: String,
    permissions: Vec<Permission>,
    /// Lifetime in seconds; zero means no expiry.
    max_age: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    origin: Option<OriginReference>,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    invalidated_at: Option<DateTime<Utc>>,
}

impl Session {
    fn new(permissions: Vec<Permission>, max_age: u64, origin: Option<OriginReference>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            permissions,
            max_age,
            origin,
            created_at: Utc::now(),
            invalidated_at: None,
        }
    }

    /// The session issued on a successful unlock: no origin, never expires,
    /// unrestricted grants over every resource.
    pub fn owner() -> Self {
        let permissions = PermissionsBuilder::new()
            .for_resource(Resource::Account)
            .allow_everything()
            .on_any()
            .for_resource(Resource::Transaction)
            .allow_everything()
            .on_any()
            .for_resource(Resource::Session)
            .allow_everything()
            .on_any()
            .build();
        Self::new(permissions, 0, None)
    }

    /// A scoped session for an external caller.
    pub fn external(permissions: Vec<Permission>, max_age: u64, origin: OriginReference) -> Self {
        Self::new(permissions, max_age, Some(origin))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    pub fn origin(&self) -> Option<&OriginReference> {
        self.origin.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn invalidated_at(&self) -> Option<DateTime<Utc>> {
        self.invalidated_at
    }

    /// Whether the session is live at `now`: not revoked, and either ageless
    /// or still inside its lifetime window.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.invalidated_at.is_some() {
            return false;
        }
        if self.max_age == 0 {
            return true;
        }
        match i64::try_from(self.max_age).ok().and_then(TimeDelta::try_seconds) {
            Some(limit) => now.signed_duration_since(self.created_at) < limit,
            // A lifetime too large for the clock arithmetic never expires.
            None => true,
        }
    }

    /// Whether any grant covers `(resource, action)` for at least one
    /// identity. Used for operations that are not targeted at a specific
    /// record, such as listing.
    pub fn is_allowed(&self, resource: Resource, action: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.matches(resource, action))
    }

    /// Whether a grant covers `(resource, action)` for this exact identity
    /// (or the any-identity wildcard).
    pub fn is_allowed_on(&self, resource: Resource, action: &str, identity: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.grants(resource, action, identity))
    }

    /// Revoke the session. Stamps `invalidated_at` once; revoking an already
    /// revoked session keeps the original timestamp.
    pub fn invalidate(&mut self, at: DateTime<Utc>) {
        if self.invalidated_at.is_none() {
            self.invalidated_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_accounts() -> Vec<Permission> {
        PermissionsBuilder::new()
            .for_resource(Resource::Account)
            .allow("read")
            .on_any()
            .build()
    }

    fn example_origin() -> OriginReference {
        OriginReference::new("https://example.com").unwrap()
    }

    #[test]
    fn owner_session_never_expires() {
        let session = Session::owner();
        let far_future = session.created_at() + TimeDelta::try_days(365 * 10).unwrap();
        assert_eq!(session.max_age(), 0);
        assert!(session.origin().is_none());
        assert!(session.is_valid_at(far_future));
    }

    #[test]
    fn scoped_session_expires_after_max_age() {
        let session = Session::external(read_accounts(), 60, example_origin());
        let created = session.created_at();
        assert!(session.is_valid_at(created + TimeDelta::try_seconds(59).unwrap()));
        assert!(!session.is_valid_at(created + TimeDelta::try_seconds(61).unwrap()));
    }

    #[test]
    fn revoked_session_is_invalid_regardless_of_age() {
        let mut session = Session::owner();
        let now = session.created_at();
        session.invalidate(now);
        assert!(!session.is_valid_at(now));
    }

    #[test]
    fn invalidation_keeps_the_first_timestamp() {
        let mut session = Session::owner();
        let first = session.created_at();
        let later = first + TimeDelta::try_seconds(30).unwrap();
        session.invalidate(first);
        session.invalidate(later);
        assert_eq!(session.invalidated_at(), Some(first));
    }

    #[test]
    fn owner_session_grants_every_resource() {
        let session = Session::owner();
        assert!(session.is_allowed(Resource::Session, "list"));
        assert!(session.is_allowed_on(Resource::Account, "read", "some-account-id"));
        assert!(session.is_allowed_on(Resource::Transaction, "sign", "any"));
    }

    #[test]
    fn scoped_session_only_grants_what_it_holds() {
        let session = Session::external(read_accounts(), 60, example_origin());
        assert!(session.is_allowed(Resource::Account, "read"));
        assert!(session.is_allowed_on(Resource::Account, "read", "acct-1"));
        assert!(!session.is_allowed(Resource::Account, "update"));
        assert!(!session.is_allowed(Resource::Session, "list"));
    }

    #[test]
    fn serializes_without_empty_optional_fields() {
        let session = Session::owner();
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("origin"));
        assert!(!json.contains("invalidated_at"));

        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}
