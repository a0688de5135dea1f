// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Vault Configuration Constants
//!
//! This module defines the tunable defaults for the vault core. Embedding
//! applications override them through [`TellerConfig`] instead of editing
//! call sites.
//!
//! ## Tunables
//!
//! | Constant | Description | Default |
//! |----------|-------------|---------|
//! | `MAX_PASSPHRASE_ATTEMPTS` | Consecutive wrong-passphrase failures before the vault force-locks | `4` |
//! | `DEFAULT_EXTERNAL_MAX_AGE_SECS` | Lifetime of an external session whose request does not pick one | `3600` |
//! | `PBKDF2_ITERATIONS` | PBKDF2-HMAC-SHA256 rounds for the vault key | `100000` |

use std::num::NonZeroU32;

/// Consecutive authentication failures for a single secret id before the
/// vault force-locks and discards all in-memory state.
pub const MAX_PASSPHRASE_ATTEMPTS: u32 = 4;

/// Lifetime, in seconds, granted to an external session whose access request
/// left `max_age` at zero. External sessions always expire; zero never means
/// "forever" for them.
pub const DEFAULT_EXTERNAL_MAX_AGE_SECS: u64 = 3_600;

/// PBKDF2-HMAC-SHA256 iteration count for deriving the vault key from a
/// passphrase. Unlock cost scales linearly with this value.
pub const PBKDF2_ITERATIONS: NonZeroU32 = NonZeroU32::new(100_000).unwrap();

/// Runtime configuration for a [`VaultTeller`](crate::teller::VaultTeller).
#[derive(Debug, Clone)]
pub struct TellerConfig {
    /// Wrong-passphrase failures tolerated per secret id before lockout.
    pub max_passphrase_attempts: u32,
    /// Max age substituted for external access requests that pass zero.
    pub external_session_max_age_secs: u64,
}

impl Default for TellerConfig {
    fn default() -> Self {
        Self {
            max_passphrase_attempts: MAX_PASSPHRASE_ATTEMPTS,
            external_session_max_age_secs: DEFAULT_EXTERNAL_MAX_AGE_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let config = TellerConfig::default();
        assert_eq!(config.max_passphrase_attempts, MAX_PASSPHRASE_ATTEMPTS);
        assert_eq!(
            config.external_session_max_age_secs,
            DEFAULT_EXTERNAL_MAX_AGE_SECS
        );
    }
}
