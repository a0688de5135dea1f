// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Accounts, key material, and address derivation.
//!
//! An [`Account`] keeps its private key AEAD-encrypted under the account's
//! own passphrase even inside the (already encrypted) vault, so retrieving
//! it always takes both the vault passphrase and the account passphrase.
//! [`AccountReference`] is the non-secret projection handed to callers;
//! nothing outside this module can serialize key material by accident.

use chrono::{DateTime, Utc};
use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::crypto::EncryptedPayload;
use crate::domain::asset::Asset;
use crate::error::VaultError;

/// A freshly derived secp256k1 keypair plus its display address. Holds the
/// private key as hex only transiently; the teller encrypts it before it is
/// stored anywhere.
#[derive(Debug)]
pub(crate) struct Keypair {
    private_key: Zeroizing<String>,
    public_key: String,
    address: String,
}

impl Keypair {
    /// Generate a random keypair.
    pub(crate) fn generate() -> Keypair {
        use k256::elliptic_curve::rand_core::OsRng;

        let signing_key = SigningKey::random(&mut OsRng);
        Keypair::from_signing_key(&signing_key)
    }

    /// Derive a keypair from a hex-encoded master seed (as produced by
    /// recovery-phrase derivation). The first 32 seed bytes are taken as the
    /// scalar candidate; in the astronomically rare case the candidate falls
    /// outside the curve order it is re-hashed until one fits.
    pub(crate) fn from_seed_hex(seed_hex: &str) -> Result<Keypair, VaultError> {
        let seed = hex::decode(seed_hex)
            .map_err(|_| VaultError::InvalidRequest("Seed is not valid hex".to_string()))?;
        if seed.len() < 32 {
            return Err(VaultError::InvalidRequest(
                "Seed must be at least 32 bytes".to_string(),
            ));
        }

        let mut candidate = [0u8; 32];
        candidate.copy_from_slice(&seed[..32]);
        for _ in 0..8 {
            if let Ok(signing_key) = SigningKey::from_slice(&candidate) {
                return Ok(Keypair::from_signing_key(&signing_key));
            }
            candidate = Sha256::digest(candidate).into();
        }
        Err(VaultError::InvalidRequest(
            "Seed does not yield a usable key".to_string(),
        ))
    }

    /// Rebuild a keypair from a hex-encoded private key. Accepts an optional
    /// `0x` prefix.
    pub(crate) fn from_private_key_hex(private_key: &str) -> Result<Keypair, VaultError> {
        let trimmed = private_key.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(stripped)
            .map_err(|_| VaultError::InvalidRequest("Private key is not valid hex".to_string()))?;
        let signing_key = SigningKey::from_slice(&bytes).map_err(|_| {
            VaultError::InvalidRequest("Private key is not a valid secp256k1 key".to_string())
        })?;
        Ok(Keypair::from_signing_key(&signing_key))
    }

    fn from_signing_key(signing_key: &SigningKey) -> Keypair {
        let verifying_key = signing_key.verifying_key();

        // SEC1 compressed encoding (33 bytes: parity prefix + x coordinate)
        let compressed = verifying_key.to_encoded_point(true);
        let public_key = hex::encode(compressed.as_bytes());
        let address = derive_address(compressed.as_bytes());

        Keypair {
            private_key: Zeroizing::new(hex::encode(signing_key.to_bytes())),
            public_key,
            address,
        }
    }

    pub(crate) fn private_key(&self) -> &str {
        &self.private_key
    }

    pub(crate) fn public_key(&self) -> &str {
        &self.public_key
    }

    pub(crate) fn address(&self) -> &str {
        &self.address
    }
}

/// Derive the display address from a compressed public key:
/// SHA-256 over the 33-byte SEC1 encoding, first 20 bytes, hex with a
/// `0x` prefix.
fn derive_address(compressed_public_key: &[u8]) -> String {
    let hash = Sha256::digest(compressed_public_key);
    format!("0x{}", hex::encode(&hash[..20]))
}

/// A wallet account held inside the vault. The display `name` is the only
/// mutable field; everything else is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: String,
    name: String,
    public_key: String,
    /// Private key hex, AEAD-encrypted under the account passphrase.
    private_key: EncryptedPayload,
    address: String,
    asset: Asset,
    created_at: DateTime<Utc>,
}

impl Account {
    pub(crate) fn new(
        name: &str,
        asset: Asset,
        public_key: &str,
        address: &str,
        private_key: EncryptedPayload,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            public_key: public_key.to_string(),
            private_key,
            address: address.to_string(),
            asset,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn private_key(&self) -> &EncryptedPayload {
        &self.private_key
    }

    pub(crate) fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Reassign the id, used when an import replaces an existing account so
    /// references held by callers stay stable.
    pub(crate) fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }
}

/// Non-secret projection of an [`Account`] for callers outside the vault
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountReference {
    id: String,
    name: String,
    address: String,
    public_key: String,
    asset: Asset,
    created_at: DateTime<Utc>,
}

impl AccountReference {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl From<&Account> for AccountReference {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            address: account.address.clone(),
            public_key: account.public_key.clone(),
            asset: account.asset.clone(),
            created_at: account.created_at,
        }
    }
}
