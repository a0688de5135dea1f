// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remember-passphrase cache.
//!
//! Holds the vault passphrase encrypted under an ephemeral random key that
//! never leaves the process, so the plaintext passphrase is not resident
//! between unlocks. Locking the vault (or tripping the lockout) drops the
//! cache, key and all.

use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::crypto::{
    CryptoError, CryptoResult, EncryptedPayload, EncryptionService, RingEncryptionService,
};

/// One cached passphrase and the ephemeral key it is sealed under.
#[derive(Clone)]
pub(crate) struct PassphraseCache {
    service: RingEncryptionService,
    key: Zeroizing<String>,
    slot: EncryptedPayload,
}

impl PassphraseCache {
    /// Seal `passphrase` under a fresh random key.
    pub(crate) async fn store(passphrase: &str) -> CryptoResult<Self> {
        let mut key_bytes = [0u8; 32];
        SystemRandom::new()
            .fill(&mut key_bytes)
            .map_err(|_| CryptoError::Backend)?;
        let key = Zeroizing::new(hex::encode(key_bytes));

        let service = RingEncryptionService::default();
        let slot = service.encrypt(&key, passphrase).await?;
        Ok(Self { service, key, slot })
    }

    /// Unseal the cached passphrase.
    pub(crate) async fn load(&self) -> CryptoResult<Zeroizing<String>> {
        let passphrase = self.service.decrypt(&self.key, &self.slot).await?;
        Ok(Zeroizing::new(passphrase))
    }
}

impl std::fmt::Debug for PassphraseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // neither the key nor the sealed slot belongs in logs
        f.debug_struct("PassphraseCache").finish_non_exhaustive()
    }
}
