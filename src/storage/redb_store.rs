// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded storage backend backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `vault`: fixed key → serialized vault envelope (JSON bytes)
//! - `sessions`: session_id → serialized Session (JSON bytes)
//!
//! One database file carries both storage contracts, which suits embedders
//! that get a single opaque storage area rather than a directory tree.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{SessionStore, StorageError, StorageResult, VaultStore};
use crate::crypto::EncryptedPayload;
use crate::domain::Session;

/// Singleton table: the one vault envelope lives under [`VAULT_KEY`].
const VAULT: TableDefinition<&str, &[u8]> = TableDefinition::new("vault");

/// Session records: session_id → serialized Session (JSON bytes).
const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

const VAULT_KEY: &str = "vault";

impl From<redb::DatabaseError> for StorageError {
    fn from(e: redb::DatabaseError) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<redb::TransactionError> for StorageError {
    fn from(e: redb::TransactionError) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<redb::TableError> for StorageError {
    fn from(e: redb::TableError) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<redb::StorageError> for StorageError {
    fn from(e: redb::StorageError) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<redb::CommitError> for StorageError {
    fn from(e: redb::CommitError) -> Self {
        StorageError::Database(e.to_string())
    }
}

/// Both storage contracts over a single redb database file.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create both tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(VAULT)?;
            let _ = write_txn.open_table(SESSIONS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

#[async_trait::async_trait]
impl VaultStore for RedbStore {
    async fn get(&self) -> StorageResult<Option<EncryptedPayload>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(VAULT)?;
        match table.get(VAULT_KEY)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    async fn set(&self, envelope: &EncryptedPayload) -> StorageResult<()> {
        let json = serde_json::to_vec(envelope)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(VAULT)?;
            table.insert(VAULT_KEY, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for RedbStore {
    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Session>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> StorageResult<Vec<Session>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;

        let mut sessions = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            sessions.push(serde_json::from_slice(value.value())?);
        }
        sessions.sort_by_key(|s: &Session| s.created_at());
        Ok(sessions)
    }

    async fn save(&self, session: &Session) -> StorageResult<()> {
        let json = serde_json::to_vec(session)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            table.insert(session.id(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    async fn remove_all(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            write_txn.delete_table(SESSIONS)?;
            let _ = write_txn.open_table(SESSIONS)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
