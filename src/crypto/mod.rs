// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Encryption Service
//!
//! Passphrase-based authenticated encryption for the vault blob and account
//! keys, plus deterministic BIP-39 seed derivation for recovery phrases.
//!
//! ## Key Derivation
//!
//! ```text
//! passphrase + random salt --PBKDF2-HMAC-SHA256--> 256-bit key
//! key + random nonce       --AES-256-GCM--------> ciphertext || tag
//! ```
//!
//! Every `encrypt` call draws a fresh salt and nonce, so encrypting the same
//! plaintext twice never yields the same envelope. `decrypt` authenticates
//! before returning anything; a wrong passphrase and a tampered envelope both
//! surface as the same [`CryptoError::Decryption`].
//!
//! The service is a trait so the teller stays backend-agnostic; the shipped
//! implementation is [`RingEncryptionService`].

pub mod envelope;
pub mod ring_service;
pub mod seed;

pub use envelope::EncryptedPayload;
pub use ring_service::RingEncryptionService;

/// Error type for encryption service operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Authenticated decryption failed: wrong passphrase or corrupted
    /// envelope. The two cases carry no distinguishing detail.
    #[error("Incorrect password")]
    Decryption,

    /// The recovery phrase is missing, misspelled, or fails its checksum.
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// The crypto backend itself failed (entropy source, key setup). Not a
    /// wrong-password signal.
    #[error("Crypto backend failure")]
    Backend,
}

/// Result type for encryption service operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Capability contract for passphrase-based encryption and seed derivation.
///
/// Implementations must be stateless with respect to calls: no key caching,
/// no envelope reuse. All randomness is drawn per call.
#[async_trait::async_trait]
pub trait EncryptionService: Send + Sync {
    /// Encrypt `plaintext` under `passphrase`, returning a self-describing
    /// envelope. Two calls with identical inputs produce distinct envelopes.
    async fn encrypt(&self, passphrase: &str, plaintext: &str) -> CryptoResult<EncryptedPayload>;

    /// Decrypt an envelope produced by [`EncryptionService::encrypt`].
    ///
    /// # Errors
    /// [`CryptoError::Decryption`] on any authentication failure.
    async fn decrypt(&self, passphrase: &str, payload: &EncryptedPayload) -> CryptoResult<String>;

    /// Derive the 64-byte BIP-39 seed for a mnemonic and optional extra
    /// passphrase, hex encoded. Deterministic: identical inputs always yield
    /// identical output.
    ///
    /// # Errors
    /// [`CryptoError::InvalidMnemonic`] when the phrase fails checksum
    /// validation.
    async fn derive_seed(&self, mnemonic: &str, passphrase: Option<&str>) -> CryptoResult<String>;
}
