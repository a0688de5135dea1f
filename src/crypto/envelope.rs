// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Self-describing ciphertext envelope.
//!
//! The envelope carries everything needed to re-derive the key and
//! authenticate the payload: base64 ciphertext (with the GCM tag appended),
//! the nonce, and the KDF salt. It is the unit persisted by the vault store
//! and embedded per account for private keys.

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};

use super::{CryptoError, CryptoResult};

/// Encrypted payload envelope: `{data, iv, salt}`, all base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Ciphertext with the 16-byte authentication tag appended.
    pub data: String,
    /// 96-bit AES-GCM nonce.
    pub iv: String,
    /// Salt fed to the key derivation function.
    pub salt: String,
}

impl EncryptedPayload {
    pub(crate) fn from_parts(data: &[u8], iv: &[u8], salt: &[u8]) -> Self {
        Self {
            data: Base64::encode_string(data),
            iv: Base64::encode_string(iv),
            salt: Base64::encode_string(salt),
        }
    }

    pub(crate) fn data_bytes(&self) -> CryptoResult<Vec<u8>> {
        decode_field(&self.data)
    }

    pub(crate) fn iv_bytes(&self) -> CryptoResult<Vec<u8>> {
        decode_field(&self.iv)
    }

    pub(crate) fn salt_bytes(&self) -> CryptoResult<Vec<u8>> {
        decode_field(&self.salt)
    }
}

// A field that fails to decode is a corrupted envelope and must be
// indistinguishable from an authentication failure.
fn decode_field(field: &str) -> CryptoResult<Vec<u8>> {
    Base64::decode_vec(field).map_err(|_| CryptoError::Decryption)
}
