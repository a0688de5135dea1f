// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Filesystem storage backend.
//!
//! ## Storage Layout
//!
//! ```text
//! <root>/
//!   vault.json            # the encrypted vault envelope
//!   sessions/
//!     {session_id}.json   # one record per session, never deleted
//! ```
//!
//! Writes land in a temp file first and are renamed into place, so a crash
//! mid-write leaves the previous record intact. The envelope contents are
//! already ciphertext; this layer adds no crypto of its own.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use super::{SessionStore, StorageResult, VaultStore};
use crate::crypto::EncryptedPayload;
use crate::domain::Session;

/// Path utilities for the on-disk layout.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persisted data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the encrypted vault envelope.
    pub fn vault_file(&self) -> PathBuf {
        self.root.join("vault.json")
    }

    /// Directory containing all session records.
    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("sessions")
    }

    /// Path to a specific session record.
    pub fn session_file(&self, session_id: &str) -> PathBuf {
        self.sessions_dir().join(format!("{session_id}.json"))
    }
}

/// Both storage contracts over plain JSON files.
#[derive(Debug, Clone)]
pub struct FileStore {
    paths: StoragePaths,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory layout.
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let paths = StoragePaths::new(root);
        fs::create_dir_all(paths.sessions_dir())?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let reader = BufReader::new(file);
        let value = serde_json::from_reader(reader)?;
        Ok(Some(value))
    }

    /// Write a JSON file (atomic write via rename).
    fn write_json<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

/// Session records are keyed by the ids we mint (UUIDs). Anything else gets
/// no path at all, which keeps hostile lookup ids out of the tree.
fn is_storable_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[async_trait::async_trait]
impl VaultStore for FileStore {
    async fn get(&self) -> StorageResult<Option<EncryptedPayload>> {
        Self::read_json(&self.paths.vault_file())
    }

    async fn set(&self, envelope: &EncryptedPayload) -> StorageResult<()> {
        Self::write_json(&self.paths.vault_file(), envelope)
    }
}

#[async_trait::async_trait]
impl SessionStore for FileStore {
    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Session>> {
        if !is_storable_id(id) {
            return Ok(None);
        }
        Self::read_json(&self.paths.session_file(id))
    }

    async fn list(&self) -> StorageResult<Vec<Session>> {
        let mut sessions = Vec::new();
        for entry in fs::read_dir(self.paths.sessions_dir())? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(session) = Self::read_json::<Session>(&path)? {
                    sessions.push(session);
                }
            }
        }
        sessions.sort_by_key(|s| s.created_at());
        Ok(sessions)
    }

    async fn save(&self, session: &Session) -> StorageResult<()> {
        Self::write_json(&self.paths.session_file(session.id()), session)
    }

    async fn remove_all(&self) -> StorageResult<()> {
        for entry in fs::read_dir(self.paths.sessions_dir())? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
