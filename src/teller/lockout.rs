// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wrong-passphrase lockout policy.
//!
//! One counter per secret: the vault passphrase is one id, each account's
//! passphrase is another. The policy only counts; force-locking on a tripped
//! threshold is the teller's job.

use std::collections::HashMap;

/// Which secret an authentication attempt was against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum SecretId {
    /// The vault passphrase.
    Vault,
    /// The passphrase of the account with this id.
    Account(String),
}

/// Consecutive-failure counters keyed by secret.
#[derive(Debug)]
pub(crate) struct LockoutPolicy {
    max_attempts: u32,
    failures: HashMap<SecretId, u32>,
}

impl LockoutPolicy {
    pub(crate) fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            failures: HashMap::new(),
        }
    }

    /// Record a wrong-passphrase outcome. Returns true when this secret has
    /// reached the threshold and the vault must force-lock.
    pub(crate) fn record_failure(&mut self, id: SecretId) -> bool {
        let count = self.failures.entry(id).or_insert(0);
        *count += 1;
        *count >= self.max_attempts
    }

    /// A correct passphrase clears that secret's counter.
    pub(crate) fn record_success(&mut self, id: &SecretId) {
        self.failures.remove(id);
    }

    /// Clear every counter. Called as part of a force-lock.
    pub(crate) fn reset(&mut self) {
        self.failures.clear();
    }
}
