// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Vault - Encrypted Keystore & Session Authorization Core
//!
//! This crate provides the security core of a key-management wallet: a
//! passphrase-encrypted vault of accounts, capability-scoped sessions for
//! external callers, and dual-passphrase private-key custody.
//!
//! ## Modules
//!
//! - `teller` - Vault orchestrator (lifecycle, sessions, accounts)
//! - `domain` - Vault, accounts, sessions, permissions, assets
//! - `crypto` - AEAD encryption service and seed derivation (ring)
//! - `storage` - Vault and session persistence (memory, fs, redb)

pub mod config;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod storage;
pub mod teller;

pub use config::TellerConfig;
pub use crypto::{CryptoError, EncryptedPayload, EncryptionService, RingEncryptionService};
pub use domain::{
    Account, AccountReference, Asset, ExternalAccessRequest, Network, OriginReference, Permission,
    PermissionsBuilder, Protocol, ProtocolName, Resource, Session, Vault,
};
pub use error::{RestoreFailure, UnauthorizedReason, VaultError, VaultResult};
pub use storage::{FileStore, MemoryStore, RedbStore, SessionStore, StorageError, VaultStore};
pub use teller::{NewAccount, VaultTeller};
