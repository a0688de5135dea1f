// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory storage backend.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{SessionStore, StorageResult, VaultStore};
use crate::crypto::EncryptedPayload;
use crate::domain::Session;

/// Both storage contracts over process memory. Nothing survives drop, which
/// is exactly what tests want.
#[derive(Debug, Default)]
pub struct MemoryStore {
    vault: RwLock<Option<EncryptedPayload>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VaultStore for MemoryStore {
    async fn get(&self) -> StorageResult<Option<EncryptedPayload>> {
        Ok(self.vault.read().await.clone())
    }

    async fn set(&self, envelope: &EncryptedPayload) -> StorageResult<()> {
        *self.vault.write().await = Some(envelope.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for MemoryStore {
    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn list(&self) -> StorageResult<Vec<Session>> {
        let mut sessions: Vec<Session> = self.sessions.read().await.values().cloned().collect();
        sessions.sort_by_key(|s| s.created_at());
        Ok(sessions)
    }

    async fn save(&self, session: &Session) -> StorageResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.id().to_string(), session.clone());
        Ok(())
    }

    async fn remove_all(&self) -> StorageResult<()> {
        self.sessions.write().await.clear();
        Ok(())
    }
}
