// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! BIP-39 seed derivation for recovery phrases.
//!
//! The phrase is checksum-validated, then stretched into a 64-byte seed with
//! PBKDF2-HMAC-SHA512 (2048 rounds) over the NFKD-normalized words, salted
//! with `"mnemonic" + passphrase`. Output matches the published reference
//! vectors, so accounts recovered here line up with any standard wallet.

use bip39::{Language, Mnemonic, Seed};
use unicode_normalization::UnicodeNormalization;

use super::{CryptoError, CryptoResult};

/// Derive the hex-encoded 64-byte seed for `mnemonic` and an optional extra
/// passphrase.
///
/// Word separators are collapsed to single spaces and both inputs are NFKD
/// normalized before derivation, so visually identical phrases always
/// produce identical seeds.
///
/// # Errors
/// [`CryptoError::InvalidMnemonic`] when the phrase is empty or fails
/// checksum validation.
pub fn derive_seed(mnemonic: &str, passphrase: Option<&str>) -> CryptoResult<String> {
    let phrase = normalize(mnemonic);
    if phrase.is_empty() {
        return Err(CryptoError::InvalidMnemonic(
            "recovery phrase is required".to_string(),
        ));
    }

    let mnemonic = Mnemonic::from_phrase(&phrase, Language::English)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
    let password: String = passphrase.unwrap_or("").nfkd().collect();

    let seed = Seed::new(&mnemonic, &password);
    Ok(hex::encode(seed.as_bytes()))
}

fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .nfkd()
        .collect()
}
