// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The vault aggregate: every account plus creation metadata.
//!
//! A vault exists decrypted in memory only while the teller holds it; at
//! rest it is a single AEAD envelope. All mutation goes through the methods
//! here so address uniqueness holds no matter which teller operation drives
//! the change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::{Account, AccountReference};
use crate::error::VaultError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    accounts: Vec<Account>,
    created_at: DateTime<Utc>,
}

impl Vault {
    pub(crate) fn new() -> Self {
        Self {
            accounts: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn account_by_id(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id() == id)
    }

    pub(crate) fn account_by_id_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id() == id)
    }

    /// Add a new account, refusing a duplicate address.
    pub(crate) fn add_account(&mut self, account: Account) -> Result<AccountReference, VaultError> {
        if self.accounts.iter().any(|a| a.address() == account.address()) {
            return Err(VaultError::AccountExists {
                address: account.address().to_string(),
            });
        }
        let reference = AccountReference::from(&account);
        self.accounts.push(account);
        Ok(reference)
    }

    /// Add an account, replacing any existing account at the same address.
    /// The replacement inherits the existing account's id so references held
    /// by callers stay stable.
    pub(crate) fn replace_or_add_account(&mut self, mut account: Account) -> AccountReference {
        match self
            .accounts
            .iter()
            .position(|a| a.address() == account.address())
        {
            Some(index) => {
                account.set_id(self.accounts[index].id());
                let reference = AccountReference::from(&account);
                self.accounts[index] = account;
                reference
            }
            None => {
                let reference = AccountReference::from(&account);
                self.accounts.push(account);
                reference
            }
        }
    }

    pub(crate) fn remove_account(&mut self, id: &str) -> Result<(), VaultError> {
        let index = self
            .accounts
            .iter()
            .position(|a| a.id() == id)
            .ok_or_else(|| VaultError::AccountNotFound(id.to_string()))?;
        self.accounts.remove(index);
        Ok(())
    }
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptedPayload;
    use crate::domain::account::Keypair;
    use crate::domain::asset::{Asset, Protocol, ProtocolName};

    fn avax_asset() -> Asset {
        let protocol = Protocol::new(ProtocolName::Avalanche, "43114").unwrap();
        Asset::new("Avalanche", "AVAX", protocol)
    }

    fn test_account(name: &str) -> Account {
        let keypair = Keypair::generate();
        Account::new(
            name,
            avax_asset(),
            keypair.public_key(),
            keypair.address(),
            EncryptedPayload::from_parts(b"ciphertext", b"iv", b"salt"),
        )
    }

    #[test]
    fn duplicate_addresses_are_refused() {
        let mut vault = Vault::new();
        let account = test_account("First");
        let duplicate = account.clone();

        vault.add_account(account).unwrap();
        let err = vault.add_account(duplicate).unwrap_err();
        assert!(matches!(err, VaultError::AccountExists { .. }));
        assert_eq!(vault.accounts().len(), 1);
    }

    #[test]
    fn replacing_keeps_the_existing_id() {
        let mut vault = Vault::new();
        let original = test_account("Original");
        let original_id = vault.add_account(original.clone()).unwrap().id().to_string();

        let mut replacement = original;
        replacement.rename("Replacement");
        let reference = vault.replace_or_add_account(replacement);

        assert_eq!(reference.id(), original_id);
        assert_eq!(reference.name(), "Replacement");
        assert_eq!(vault.accounts().len(), 1);
    }

    #[test]
    fn replace_falls_back_to_add_for_new_addresses() {
        let mut vault = Vault::new();
        vault.replace_or_add_account(test_account("Only"));
        assert_eq!(vault.accounts().len(), 1);
    }

    #[test]
    fn removing_an_unknown_account_fails() {
        let mut vault = Vault::new();
        let err = vault.remove_account("no-such-id").unwrap_err();
        assert!(matches!(err, VaultError::AccountNotFound(_)));
    }

    #[test]
    fn rename_reaches_the_stored_account() {
        let mut vault = Vault::new();
        let id = vault
            .add_account(test_account("Before"))
            .unwrap()
            .id()
            .to_string();

        vault.account_by_id_mut(&id).unwrap().rename("After");
        assert_eq!(vault.account_by_id(&id).unwrap().name(), "After");
    }

    #[test]
    fn serialization_round_trips() {
        let mut vault = Vault::new();
        vault.add_account(test_account("Persisted")).unwrap();

        let json = serde_json::to_string(&vault).unwrap();
        let restored: Vault = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, vault);
    }
}
