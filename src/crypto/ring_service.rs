// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `ring`-backed encryption service.
//!
//! PBKDF2-HMAC-SHA256 stretches the passphrase into a 256-bit key under a
//! fresh 128-bit salt; AES-256-GCM seals the plaintext under a fresh 96-bit
//! nonce. Derived keys live in [`Zeroizing`] buffers and are wiped on drop.

use std::num::NonZeroU32;

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use super::{seed, CryptoError, CryptoResult, EncryptedPayload, EncryptionService};
use crate::config;

/// KDF salt length in bytes.
const SALT_LEN: usize = 16;

/// AES-256 key length in bytes.
const KEY_LEN: usize = 32;

/// Production [`EncryptionService`] backed by `ring`.
#[derive(Debug, Clone)]
pub struct RingEncryptionService {
    rng: SystemRandom,
    iterations: NonZeroU32,
}

impl RingEncryptionService {
    /// Create a service with an explicit PBKDF2 iteration count.
    pub fn new(iterations: NonZeroU32) -> Self {
        Self {
            rng: SystemRandom::new(),
            iterations,
        }
    }

    fn random_bytes<const N: usize>(&self) -> CryptoResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.rng.fill(&mut buf).map_err(|_| CryptoError::Backend)?;
        Ok(buf)
    }

    fn derive_key(&self, passphrase: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            salt,
            passphrase.as_bytes(),
            &mut key[..],
        );
        key
    }

    fn aead_key(&self, passphrase: &str, salt: &[u8]) -> CryptoResult<LessSafeKey> {
        let key = self.derive_key(passphrase, salt);
        let unbound = UnboundKey::new(&AES_256_GCM, &key[..]).map_err(|_| CryptoError::Backend)?;
        Ok(LessSafeKey::new(unbound))
    }
}

impl Default for RingEncryptionService {
    fn default() -> Self {
        Self::new(config::PBKDF2_ITERATIONS)
    }
}

#[async_trait::async_trait]
impl EncryptionService for RingEncryptionService {
    async fn encrypt(&self, passphrase: &str, plaintext: &str) -> CryptoResult<EncryptedPayload> {
        let salt: [u8; SALT_LEN] = self.random_bytes()?;
        let iv: [u8; NONCE_LEN] = self.random_bytes()?;

        let key = self.aead_key(passphrase, &salt)?;
        let mut in_out = plaintext.as_bytes().to_vec();
        key.seal_in_place_append_tag(Nonce::assume_unique_for_key(iv), Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Backend)?;

        Ok(EncryptedPayload::from_parts(&in_out, &iv, &salt))
    }

    async fn decrypt(&self, passphrase: &str, payload: &EncryptedPayload) -> CryptoResult<String> {
        let mut data = payload.data_bytes()?;
        let iv: [u8; NONCE_LEN] = payload
            .iv_bytes()?
            .try_into()
            .map_err(|_| CryptoError::Decryption)?;
        let salt = payload.salt_bytes()?;

        let key = self.aead_key(passphrase, &salt)?;
        let plaintext = key
            .open_in_place(Nonce::assume_unique_for_key(iv), Aad::empty(), &mut data)
            .map_err(|_| CryptoError::Decryption)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::Decryption)
    }

    async fn derive_seed(&self, mnemonic: &str, passphrase: Option<&str>) -> CryptoResult<String> {
        seed::derive_seed(mnemonic, passphrase)
    }
}
