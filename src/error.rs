// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy for the vault core.
//!
//! Wrong-password failures are structured, not stringly-typed: callers branch
//! on [`VaultError::is_vault_password_wrong`] and
//! [`VaultError::is_account_password_wrong`] to re-prompt for the right
//! secret instead of showing a generic failure banner.

use crate::crypto::CryptoError;
use crate::storage::StorageError;

/// Why restoring the vault from storage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RestoreFailure {
    /// No encrypted vault envelope exists in the vault store.
    #[error("Unable to restore the vault, has it been initialized?")]
    NotInitialized,
    /// The envelope exists but did not authenticate under the passphrase.
    #[error("Unable to restore the vault, incorrect passphrase?")]
    WrongPassphrase,
}

/// Why a session-gated operation refused the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnauthorizedReason {
    #[error("Session id is required")]
    MissingSessionId,
    #[error("Session id not found")]
    UnknownSessionId,
    #[error("Session is invalid")]
    InvalidSession,
    #[error("Session is not allowed to perform this operation")]
    NotAllowed,
}

/// Public error type of the vault core.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// An empty passphrase was supplied where a secret is required.
    #[error("Passphrase cannot be empty")]
    PassphraseRequired,

    /// `initialize_vault` was called while a vault envelope already exists.
    #[error("Vault is already initialized")]
    AlreadyInitialized,

    /// The vault could not be decrypted from storage. Feeds the lockout
    /// counter when the cause is a wrong passphrase.
    #[error("{0}")]
    VaultRestore(RestoreFailure),

    /// The account passphrase did not open the account's private key.
    /// Distinct from [`VaultError::VaultRestore`] so the caller knows which
    /// secret to re-prompt for.
    #[error("Unable to restore the private key, incorrect account passphrase?")]
    PrivateKeyRestore,

    /// The supplied session id failed one of the authorization checks.
    #[error("{0}")]
    Unauthorized(UnauthorizedReason),

    /// The operation requires an unlocked vault.
    #[error("The vault must be unlocked to perform this operation")]
    NotUnlocked,

    /// The caller supplied a malformed request or argument.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No account with the given id exists in the vault.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// An account with the same derived address already exists and the
    /// caller did not ask to replace it.
    #[error("An account with address {address} already exists")]
    AccountExists { address: String },

    /// A storage adapter failure, propagated unchanged.
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    /// An encryption service failure that is not a wrong-passphrase signal.
    /// Decrypt failures never land here; they are classified into
    /// [`VaultError::VaultRestore`] or [`VaultError::PrivateKeyRestore`]
    /// depending on which secret was being opened.
    #[error("Encryption service failure: {0}")]
    Crypto(#[source] CryptoError),
}

impl VaultError {
    /// True when the failure means the vault passphrase was wrong.
    pub fn is_vault_password_wrong(&self) -> bool {
        matches!(self, VaultError::VaultRestore(RestoreFailure::WrongPassphrase))
    }

    /// True when the failure means the account passphrase was wrong.
    pub fn is_account_password_wrong(&self) -> bool {
        matches!(self, VaultError::PrivateKeyRestore)
    }
}

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;
