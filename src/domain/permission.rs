// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Capability permissions gating session-scoped operations.
//!
//! A [`Permission`] is a `(resource, action, identities)` grant. The `"*"`
//! wildcard is valid for the action and for identities and means "any".
//! Permissions are built exclusively through [`PermissionsBuilder`] so
//! call sites cannot hand-assemble malformed grants.

use serde::{Deserialize, Serialize};

/// Resource classes permissions can be granted over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Vault accounts (create, read, update, delete).
    Account,
    /// Transaction operations.
    Transaction,
    /// Session administration (list, revoke).
    Session,
}

impl Resource {
    /// Parse a resource from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Resource> {
        match s.to_lowercase().as_str() {
            "account" => Some(Resource::Account),
            "transaction" => Some(Resource::Transaction),
            "session" => Some(Resource::Session),
            _ => None,
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Account => write!(f, "account"),
            Resource::Transaction => write!(f, "transaction"),
            Resource::Session => write!(f, "session"),
        }
    }
}

/// An immutable capability grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    resource: Resource,
    action: String,
    identities: Vec<String>,
}

impl Permission {
    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn identities(&self) -> &[String] {
        &self.identities
    }

    /// True when this grant covers `action` on `resource`, ignoring
    /// identities. Used for operations that have no target identity.
    pub fn matches(&self, resource: Resource, action: &str) -> bool {
        self.resource == resource && (self.action == action || self.action == "*")
    }

    /// True when this grant covers `action` on `resource` for a specific
    /// `identity` (directly listed, or via the `"*"` wildcard).
    pub fn grants(&self, resource: Resource, action: &str, identity: &str) -> bool {
        self.matches(resource, action)
            && self.identities.iter().any(|i| i == identity || i == "*")
    }
}

/// Fluent builder producing a vector of [`Permission`] grants.
///
/// Usage: `for_resource(..)` opens a block, `allow(..)`/`allow_everything()`
/// pick actions, `on(..)`/`on_any()` pick identities, and `build()` (or a
/// further `for_resource`) closes it.
#[derive(Debug, Default)]
pub struct PermissionsBuilder {
    grants: Vec<Permission>,
}

impl PermissionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a grant block for `resource`.
    pub fn for_resource(self, resource: Resource) -> ResourceGrant {
        ResourceGrant {
            builder: self,
            resource,
            actions: Vec::new(),
            identities: Vec::new(),
        }
    }

    /// Finish building, yielding the accumulated permissions.
    pub fn build(self) -> Vec<Permission> {
        self.grants
    }
}

/// In-progress grant block for a single resource. One [`Permission`] is
/// emitted per allowed action, all sharing the block's identities.
#[derive(Debug)]
pub struct ResourceGrant {
    builder: PermissionsBuilder,
    resource: Resource,
    actions: Vec<String>,
    identities: Vec<String>,
}

impl ResourceGrant {
    /// Allow one action on this resource.
    pub fn allow(mut self, action: &str) -> Self {
        if !self.actions.iter().any(|a| a == action) {
            self.actions.push(action.to_string());
        }
        self
    }

    /// Allow every action on this resource (`"*"`).
    pub fn allow_everything(mut self) -> Self {
        self.actions = vec!["*".to_string()];
        self
    }

    /// Scope the block's grants to one identity.
    pub fn on(mut self, identity: &str) -> Self {
        if !self.identities.iter().any(|i| i == identity) {
            self.identities.push(identity.to_string());
        }
        self
    }

    /// Scope the block's grants to any identity (`"*"`).
    pub fn on_any(mut self) -> Self {
        self.identities = vec!["*".to_string()];
        self
    }

    /// Close this block and start one for another resource.
    pub fn for_resource(self, resource: Resource) -> ResourceGrant {
        self.finish().for_resource(resource)
    }

    /// Close this block and finish building.
    pub fn build(self) -> Vec<Permission> {
        self.finish().build()
    }

    fn finish(self) -> PermissionsBuilder {
        let ResourceGrant {
            mut builder,
            resource,
            actions,
            identities,
        } = self;
        for action in actions {
            builder.grants.push(Permission {
                resource,
                action,
                identities: identities.clone(),
            });
        }
        builder
    }
}
