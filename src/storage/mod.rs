// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Adapters
//!
//! Swappable persistence behind two capability contracts: [`VaultStore`]
//! for the single encrypted vault envelope and [`SessionStore`] for the
//! append-only session records.
//!
//! ## Contracts
//!
//! | Trait | Methods | Holds |
//! |-------|---------|-------|
//! | `VaultStore` | `get`, `set` | the one AEAD envelope wrapping the vault |
//! | `SessionStore` | `get_by_id`, `list`, `save`, `remove_all` | session records keyed by id |
//!
//! A missing vault envelope (`get()` returning `None`) is the
//! uninitialized-vault signal, not an error. Adapters carry no business
//! logic; failures propagate unchanged, and retry policy belongs to the
//! caller.
//!
//! ## Backends
//!
//! - [`MemoryStore`] keeps everything in process memory; nothing survives
//!   drop. The backend of choice for tests.
//! - [`FileStore`] lays JSON files under a data root, with atomic
//!   tmp-file + rename writes.
//! - [`RedbStore`] packs both contracts into a single-file embedded
//!   `redb` database.

use crate::crypto::EncryptedPayload;
use crate::domain::Session;

pub mod fs;
pub mod memory;
pub mod redb_store;

pub use fs::{FileStore, StoragePaths};
pub use memory::MemoryStore;
pub use redb_store::RedbStore;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Embedded database error
    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for the single encrypted vault envelope.
#[async_trait::async_trait]
pub trait VaultStore: Send + Sync {
    /// The stored envelope, or `None` when no vault has been initialized.
    async fn get(&self) -> StorageResult<Option<EncryptedPayload>>;

    /// Overwrite the stored envelope as one blob.
    async fn set(&self, envelope: &EncryptedPayload) -> StorageResult<()>;
}

/// Persistence for session records, keyed by session id.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Session>>;

    /// All stored sessions, oldest first.
    async fn list(&self) -> StorageResult<Vec<Session>>;

    /// Insert, or overwrite the record carrying the session's id.
    async fn save(&self, session: &Session) -> StorageResult<()>;

    /// Drop every session record. The teller never calls this; it exists
    /// for the embedding application's vault-reset flow.
    async fn remove_all(&self) -> StorageResult<()>;
}
