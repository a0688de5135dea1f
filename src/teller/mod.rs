// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Vault Teller
//!
//! The orchestrator of the vault core: it owns the decrypted vault while
//! unlocked, gates every operation behind passphrases and session
//! permissions, and is the only component that talks to the encryption
//! service and the storage adapters.
//!
//! ## State machine
//!
//! ```text
//! Uninitialized ──initialize_vault──▶ Locked
//!        Locked ──unlock_vault──────▶ Unlocked
//!      Unlocked ──lock_vault────────▶ Locked
//!      Unlocked ──lockout tripped───▶ Locked   (counters and cache cleared)
//! ```
//!
//! `is_unlocked` is the only externally observable state flag; it is true
//! iff an in-memory decrypted vault is held.
//!
//! ## Mutation discipline
//!
//! Every vault mutation is decrypt-fully → mutate-in-memory →
//! re-encrypt-fully → persist as one blob, serialized under a single
//! operation lock, so a crash mid-operation cannot leave a partially
//! written vault behind. Account operations authenticate with the supplied
//! vault passphrase on every call and therefore work whether or not the
//! teller currently holds the vault in memory.

pub mod cache;
pub mod lockout;

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use zeroize::Zeroizing;

use crate::config::TellerConfig;
use crate::crypto::{CryptoError, EncryptedPayload, EncryptionService};
use crate::domain::account::Keypair;
use crate::domain::{
    Account, AccountReference, Asset, ExternalAccessRequest, Resource, Session, Vault,
};
use crate::error::{RestoreFailure, UnauthorizedReason, VaultError, VaultResult};
use crate::storage::{SessionStore, StorageError, VaultStore};

use cache::PassphraseCache;
use lockout::{LockoutPolicy, SecretId};

/// Input for the account creation operations.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name, mutable later.
    pub name: String,
    /// The asset the account holds.
    pub asset: Asset,
    /// The account's own passphrase, gating later private-key retrieval.
    pub passphrase: String,
}

/// In-memory state guarded by the sync mutex. Never held across an await.
struct TellerState {
    vault: Option<Vault>,
    lockout: LockoutPolicy,
    cache: Option<PassphraseCache>,
}

/// The vault orchestrator. See the module docs for the state machine.
pub struct VaultTeller {
    encryption: Arc<dyn EncryptionService>,
    vault_store: Arc<dyn VaultStore>,
    session_store: Arc<dyn SessionStore>,
    config: TellerConfig,
    /// Serializes decrypt-mutate-encrypt cycles across concurrent callers.
    op_lock: tokio::sync::Mutex<()>,
    state: Mutex<TellerState>,
}

impl VaultTeller {
    pub fn new(
        encryption: Arc<dyn EncryptionService>,
        vault_store: Arc<dyn VaultStore>,
        session_store: Arc<dyn SessionStore>,
        config: TellerConfig,
    ) -> Self {
        let lockout = LockoutPolicy::new(config.max_passphrase_attempts);
        Self {
            encryption,
            vault_store,
            session_store,
            config,
            op_lock: tokio::sync::Mutex::new(()),
            state: Mutex::new(TellerState {
                vault: None,
                lockout,
                cache: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, TellerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether an in-memory decrypted vault exists right now.
    pub fn is_unlocked(&self) -> bool {
        self.state().vault.is_some()
    }

    // ===== Vault lifecycle =====

    /// Create, encrypt, and persist an empty vault. Fails if a vault already
    /// exists. The teller stays locked; call [`VaultTeller::unlock_vault`]
    /// separately.
    pub async fn initialize_vault(&self, passphrase: &str) -> VaultResult<()> {
        let _guard = self.op_lock.lock().await;
        require_passphrase(passphrase)?;

        if self.vault_store.get().await?.is_some() {
            return Err(VaultError::AlreadyInitialized);
        }

        let vault = Vault::new();
        let envelope = self.encrypt_vault(passphrase, &vault).await?;
        self.vault_store.set(&envelope).await?;

        tracing::info!("Vault initialized");
        Ok(())
    }

    /// Decrypt the persisted vault into memory and mint the owner session.
    pub async fn unlock_vault(&self, passphrase: &str) -> VaultResult<Session> {
        let _guard = self.op_lock.lock().await;
        require_passphrase(passphrase)?;

        let vault = self.restore_vault(passphrase).await?;

        let session = Session::owner();
        self.session_store.save(&session).await?;
        self.state().vault = Some(vault);

        tracing::info!(session_id = %session.id(), "Vault unlocked");
        Ok(session)
    }

    /// Drop the in-memory vault and the passphrase cache. Persisted sessions
    /// and the encrypted vault on disk are untouched. Always succeeds.
    pub fn lock_vault(&self) {
        let mut state = self.state();
        state.vault = None;
        state.cache = None;
        drop(state);

        tracing::info!("Vault locked");
    }

    // ===== Sessions =====

    /// Convert a validated external request into a persisted scoped session.
    /// Requires the vault to be unlocked.
    pub async fn authorize_external(&self, request: &ExternalAccessRequest) -> VaultResult<Session> {
        let _guard = self.op_lock.lock().await;
        if self.state().vault.is_none() {
            return Err(VaultError::NotUnlocked);
        }
        request.validate()?;

        // external sessions always expire; zero means "use the default"
        let max_age = match request.max_age() {
            0 => self.config.external_session_max_age_secs,
            age => age,
        };

        let session = Session::external(
            request.permissions().to_vec(),
            max_age,
            request.origin().clone(),
        );
        self.session_store.save(&session).await?;

        tracing::info!(
            session_id = %session.id(),
            origin = %request.origin(),
            max_age,
            "External session authorized"
        );
        Ok(session)
    }

    /// All persisted sessions, oldest first. Requires `session:list`.
    pub async fn list_sessions(&self, session_id: Option<&str>) -> VaultResult<Vec<Session>> {
        self.authorize(session_id, Resource::Session, "list", None)
            .await?;
        Ok(self.session_store.list().await?)
    }

    /// Revoke the target session. Requires `session:revoke` on the target's
    /// id. The record is stamped, never deleted; revoking an already revoked
    /// session is a no-op.
    pub async fn revoke_session(
        &self,
        session_id: Option<&str>,
        target_id: &str,
    ) -> VaultResult<()> {
        self.authorize(session_id, Resource::Session, "revoke", Some(target_id))
            .await?;

        let mut target = self
            .session_store
            .get_by_id(target_id)
            .await?
            .ok_or(VaultError::Unauthorized(UnauthorizedReason::UnknownSessionId))?;
        target.invalidate(Utc::now());
        self.session_store.save(&target).await?;

        tracing::info!(session_id = %target_id, "Session revoked");
        Ok(())
    }

    /// Pure lookup: is this session currently valid? Never fails; storage
    /// trouble and unknown ids both read as invalid.
    pub async fn is_session_valid(&self, session_id: Option<&str>) -> bool {
        let Some(id) = session_id else {
            return false;
        };
        match self.session_store.get_by_id(id).await {
            Ok(Some(session)) => session.is_valid_at(Utc::now()),
            _ => false,
        }
    }

    // ===== Accounts =====

    /// Create an account with a freshly generated keypair.
    pub async fn create_account(
        &self,
        session_id: Option<&str>,
        vault_passphrase: &str,
        account: NewAccount,
    ) -> VaultResult<AccountReference> {
        let _guard = self.op_lock.lock().await;
        self.authorize(session_id, Resource::Account, "create", None)
            .await?;

        let keypair = Keypair::generate();
        self.add_account(vault_passphrase, account, keypair, false)
            .await
    }

    /// Create an account deterministically from a BIP-39 recovery phrase.
    /// The same phrase (and optional recovery passphrase) always yields the
    /// same address, so re-importing an existing phrase fails with
    /// [`VaultError::AccountExists`].
    pub async fn create_account_from_recovery_phrase(
        &self,
        session_id: Option<&str>,
        vault_passphrase: &str,
        account: NewAccount,
        recovery_phrase: &str,
        recovery_passphrase: Option<&str>,
    ) -> VaultResult<AccountReference> {
        let _guard = self.op_lock.lock().await;
        self.authorize(session_id, Resource::Account, "create", None)
            .await?;

        let seed = self
            .encryption
            .derive_seed(recovery_phrase, recovery_passphrase)
            .await
            .map_err(|e| match e {
                CryptoError::InvalidMnemonic(m) => {
                    VaultError::InvalidRequest(format!("Invalid recovery phrase: {m}"))
                }
                other => VaultError::Crypto(other),
            })?;
        let keypair = Keypair::from_seed_hex(&seed)?;

        self.add_account(vault_passphrase, account, keypair, false)
            .await
    }

    /// Import an account from a raw private key. With `replace` set, an
    /// existing account at the same address is swapped out and keeps its id;
    /// without it the import fails on a duplicate address.
    pub async fn create_account_from_private_key(
        &self,
        session_id: Option<&str>,
        vault_passphrase: &str,
        account: NewAccount,
        private_key: &str,
        replace: bool,
    ) -> VaultResult<AccountReference> {
        let _guard = self.op_lock.lock().await;
        self.authorize(session_id, Resource::Account, "create", None)
            .await?;

        let keypair = Keypair::from_private_key_hex(private_key)?;
        self.add_account(vault_passphrase, account, keypair, replace)
            .await
    }

    /// Change an account's display name.
    pub async fn update_account_name(
        &self,
        session_id: Option<&str>,
        vault_passphrase: &str,
        account_id: &str,
        name: &str,
    ) -> VaultResult<AccountReference> {
        let _guard = self.op_lock.lock().await;
        self.authorize(session_id, Resource::Account, "update", Some(account_id))
            .await?;
        require_passphrase(vault_passphrase)?;

        let mut vault = self.restore_vault(vault_passphrase).await?;
        let reference = {
            let account = vault
                .account_by_id_mut(account_id)
                .ok_or_else(|| VaultError::AccountNotFound(account_id.to_string()))?;
            account.rename(name);
            AccountReference::from(&*account)
        };
        self.persist_vault(vault_passphrase, &vault).await?;
        self.refresh_in_memory(vault);

        tracing::info!(account_id = %account_id, "Account renamed");
        Ok(reference)
    }

    /// Remove an account from the vault. The vault is rewritten without it;
    /// this does not touch sessions that may reference the account.
    pub async fn remove_account(
        &self,
        session_id: Option<&str>,
        vault_passphrase: &str,
        account: &AccountReference,
    ) -> VaultResult<()> {
        let _guard = self.op_lock.lock().await;
        self.authorize(session_id, Resource::Account, "delete", Some(account.id()))
            .await?;
        require_passphrase(vault_passphrase)?;

        let mut vault = self.restore_vault(vault_passphrase).await?;
        vault.remove_account(account.id())?;
        self.persist_vault(vault_passphrase, &vault).await?;
        self.refresh_in_memory(vault);

        tracing::info!(account_id = %account.id(), "Account removed");
        Ok(())
    }

    /// Retrieve an account's private key hex. Dual-gated: the vault
    /// passphrase opens the vault, the account passphrase opens the key.
    /// The two failures stay distinguishable so the caller knows which
    /// secret to re-prompt for, and each feeds its own lockout counter.
    pub async fn get_account_private_key(
        &self,
        session_id: Option<&str>,
        vault_passphrase: &str,
        account: &AccountReference,
        account_passphrase: &str,
    ) -> VaultResult<Zeroizing<String>> {
        let _guard = self.op_lock.lock().await;
        self.authorize(session_id, Resource::Account, "read", Some(account.id()))
            .await?;
        require_passphrase(vault_passphrase)?;
        require_passphrase(account_passphrase)?;

        let vault = self.restore_vault(vault_passphrase).await?;
        let record = vault
            .account_by_id(account.id())
            .ok_or_else(|| VaultError::AccountNotFound(account.id().to_string()))?;

        let secret = SecretId::Account(account.id().to_string());
        match self
            .encryption
            .decrypt(account_passphrase, record.private_key())
            .await
        {
            Ok(private_key) => {
                self.state().lockout.record_success(&secret);
                Ok(Zeroizing::new(private_key))
            }
            Err(CryptoError::Decryption) => {
                self.register_failure(secret);
                Err(VaultError::PrivateKeyRestore)
            }
            Err(e) => Err(VaultError::Crypto(e)),
        }
    }

    // ===== Passphrase cache =====

    /// Verify `passphrase` against the vault and keep it cached, sealed
    /// under an ephemeral key, for [`VaultTeller::unlock_from_cache`].
    pub async fn remember_passphrase(&self, passphrase: &str) -> VaultResult<()> {
        let _guard = self.op_lock.lock().await;
        require_passphrase(passphrase)?;

        let vault = self.restore_vault(passphrase).await?;
        let cache = PassphraseCache::store(passphrase)
            .await
            .map_err(VaultError::Crypto)?;
        {
            let mut state = self.state();
            state.cache = Some(cache);
        }
        self.refresh_in_memory(vault);

        tracing::debug!("Vault passphrase cached");
        Ok(())
    }

    /// Unlock using the cached passphrase. Fails with
    /// [`VaultError::PassphraseRequired`] when nothing is cached (including
    /// after a lock or a lockout, both of which clear the cache).
    pub async fn unlock_from_cache(&self) -> VaultResult<Session> {
        let cached = self.state().cache.clone();
        let cache = cached.ok_or(VaultError::PassphraseRequired)?;
        let passphrase = cache.load().await.map_err(VaultError::Crypto)?;
        self.unlock_vault(&passphrase).await
    }

    /// Drop the cached passphrase without locking.
    pub fn forget_passphrase(&self) {
        self.state().cache = None;
    }

    // ===== Internals =====

    /// The four-step session check: an id must be present, resolve to a
    /// stored session, be valid right now, and carry the permission.
    async fn authorize(
        &self,
        session_id: Option<&str>,
        resource: Resource,
        action: &str,
        identity: Option<&str>,
    ) -> VaultResult<Session> {
        let id = session_id
            .ok_or(VaultError::Unauthorized(UnauthorizedReason::MissingSessionId))?;
        let session = self
            .session_store
            .get_by_id(id)
            .await?
            .ok_or(VaultError::Unauthorized(UnauthorizedReason::UnknownSessionId))?;
        if !session.is_valid_at(Utc::now()) {
            return Err(VaultError::Unauthorized(UnauthorizedReason::InvalidSession));
        }

        let allowed = match identity {
            Some(identity) => session.is_allowed_on(resource, action, identity),
            None => session.is_allowed(resource, action),
        };
        if !allowed {
            return Err(VaultError::Unauthorized(UnauthorizedReason::NotAllowed));
        }
        Ok(session)
    }

    /// Shared tail of the account creation paths: seal the private key
    /// under the account passphrase, insert, persist, refresh.
    async fn add_account(
        &self,
        vault_passphrase: &str,
        account: NewAccount,
        keypair: Keypair,
        replace: bool,
    ) -> VaultResult<AccountReference> {
        require_passphrase(vault_passphrase)?;
        require_passphrase(&account.passphrase)?;

        let mut vault = self.restore_vault(vault_passphrase).await?;

        let sealed = self
            .encryption
            .encrypt(&account.passphrase, keypair.private_key())
            .await
            .map_err(VaultError::Crypto)?;
        let record = Account::new(
            &account.name,
            account.asset,
            keypair.public_key(),
            keypair.address(),
            sealed,
        );

        let reference = if replace {
            vault.replace_or_add_account(record)
        } else {
            vault.add_account(record)?
        };
        self.persist_vault(vault_passphrase, &vault).await?;
        self.refresh_in_memory(vault);

        tracing::info!(
            account_id = %reference.id(),
            address = %reference.address(),
            "Account stored"
        );
        Ok(reference)
    }

    /// Decrypt the persisted vault with `passphrase`, feeding the lockout
    /// policy with the outcome.
    async fn restore_vault(&self, passphrase: &str) -> VaultResult<Vault> {
        let envelope = match self.vault_store.get().await? {
            Some(envelope) => envelope,
            None => return Err(VaultError::VaultRestore(RestoreFailure::NotInitialized)),
        };

        match self.encryption.decrypt(passphrase, &envelope).await {
            Ok(plaintext) => {
                let vault: Vault =
                    serde_json::from_str(&plaintext).map_err(StorageError::from)?;
                self.state().lockout.record_success(&SecretId::Vault);
                Ok(vault)
            }
            Err(CryptoError::Decryption) => {
                self.register_failure(SecretId::Vault);
                Err(VaultError::VaultRestore(RestoreFailure::WrongPassphrase))
            }
            Err(e) => Err(VaultError::Crypto(e)),
        }
    }

    async fn encrypt_vault(
        &self,
        passphrase: &str,
        vault: &Vault,
    ) -> VaultResult<EncryptedPayload> {
        let plaintext = serde_json::to_string(vault).map_err(StorageError::from)?;
        self.encryption
            .encrypt(passphrase, &plaintext)
            .await
            .map_err(VaultError::Crypto)
    }

    async fn persist_vault(&self, passphrase: &str, vault: &Vault) -> VaultResult<()> {
        let envelope = self.encrypt_vault(passphrase, vault).await?;
        self.vault_store.set(&envelope).await?;
        Ok(())
    }

    /// Reflect a persisted mutation into the unlocked in-memory vault, when
    /// one is held. Account operations authenticate by passphrase and also
    /// run against a locked teller, in which case there is nothing to
    /// refresh.
    fn refresh_in_memory(&self, vault: Vault) {
        let mut state = self.state();
        if state.vault.is_some() {
            state.vault = Some(vault);
        }
    }

    /// Count a wrong-passphrase outcome. At the threshold the vault
    /// force-locks: in-memory vault, passphrase cache, and every counter
    /// are dropped.
    fn register_failure(&self, id: SecretId) {
        let mut state = self.state();
        if state.lockout.record_failure(id) {
            state.vault = None;
            state.cache = None;
            state.lockout.reset();
            drop(state);
            tracing::warn!("Too many wrong passphrase attempts, vault locked");
        }
    }
}

fn require_passphrase(passphrase: &str) -> VaultResult<()> {
    if passphrase.is_empty() {
        return Err(VaultError::PassphraseRequired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    use crate::crypto::RingEncryptionService;
    use crate::domain::{OriginReference, PermissionsBuilder, Protocol, ProtocolName};
    use crate::storage::MemoryStore;

    // A standard test phrase; its seed, and therefore its address, is fixed.
    const RECOVERY_PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_teller() -> VaultTeller {
        test_teller_with(TellerConfig::default())
    }

    // Repeated init across tests is fine; only the first call wins.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wallet_vault=debug")),
            )
            .with_test_writer()
            .try_init();
    }

    fn test_teller_with(config: TellerConfig) -> VaultTeller {
        let store = Arc::new(MemoryStore::new());
        let encryption = Arc::new(RingEncryptionService::new(
            NonZeroU32::new(1_000).unwrap(),
        ));
        VaultTeller::new(encryption, store.clone(), store, config)
    }

    fn avax_asset() -> Asset {
        let protocol = Protocol::new(ProtocolName::Avalanche, "43114").unwrap();
        Asset::new("Avalanche", "AVAX", protocol)
    }

    fn new_account(name: &str) -> NewAccount {
        NewAccount {
            name: name.to_string(),
            asset: avax_asset(),
            passphrase: "acctpw".to_string(),
        }
    }

    #[tokio::test]
    async fn lifecycle_locked_unlocked_locked() {
        let teller = test_teller();
        assert!(!teller.is_unlocked());

        teller.initialize_vault("pw1").await.unwrap();
        assert!(!teller.is_unlocked());

        let session = teller.unlock_vault("pw1").await.unwrap();
        assert!(teller.is_unlocked());
        assert_eq!(session.max_age(), 0);
        assert!(session.origin().is_none());

        teller.lock_vault();
        assert!(!teller.is_unlocked());
    }

    #[tokio::test]
    async fn initialize_twice_fails() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();
        let err = teller.initialize_vault("pw2").await.unwrap_err();
        assert!(matches!(err, VaultError::AlreadyInitialized));
    }

    #[tokio::test]
    async fn unlock_before_initialize_fails() {
        let teller = test_teller();
        let err = teller.unlock_vault("pw1").await.unwrap_err();
        assert!(matches!(
            err,
            VaultError::VaultRestore(RestoreFailure::NotInitialized)
        ));
        assert!(!err.is_vault_password_wrong());
    }

    #[tokio::test]
    async fn empty_passphrases_are_rejected_up_front() {
        let teller = test_teller();
        assert!(matches!(
            teller.initialize_vault("").await.unwrap_err(),
            VaultError::PassphraseRequired
        ));
        assert!(matches!(
            teller.unlock_vault("").await.unwrap_err(),
            VaultError::PassphraseRequired
        ));
    }

    #[tokio::test]
    async fn wrong_unlock_passphrase_is_flagged() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();

        let err = teller.unlock_vault("wrong").await.unwrap_err();
        assert!(err.is_vault_password_wrong());
        assert!(!teller.is_unlocked());
    }

    #[tokio::test]
    async fn account_round_trip_create_update_remove() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();
        let owner = teller.unlock_vault("pw1").await.unwrap();
        let sid = Some(owner.id());

        let created = teller
            .create_account(sid, "pw1", new_account("Savings"))
            .await
            .unwrap();
        assert_eq!(created.name(), "Savings");

        let renamed = teller
            .update_account_name(sid, "pw1", created.id(), "Spending")
            .await
            .unwrap();
        assert_eq!(renamed.id(), created.id());
        assert_eq!(renamed.name(), "Spending");

        teller.remove_account(sid, "pw1", &renamed).await.unwrap();
        let err = teller
            .update_account_name(sid, "pw1", created.id(), "Ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn private_key_retrieval_distinguishes_the_wrong_secret() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();
        let owner = teller.unlock_vault("pw1").await.unwrap();
        let sid = Some(owner.id());

        let account = teller
            .create_account(sid, "pw1", new_account("Keys"))
            .await
            .unwrap();

        let vault_err = teller
            .get_account_private_key(sid, "not-pw1", &account, "acctpw")
            .await
            .unwrap_err();
        assert!(vault_err.is_vault_password_wrong());
        assert!(!vault_err.is_account_password_wrong());

        let acct_err = teller
            .get_account_private_key(sid, "pw1", &account, "not-acctpw")
            .await
            .unwrap_err();
        assert!(acct_err.is_account_password_wrong());
        assert!(!acct_err.is_vault_password_wrong());

        let key = teller
            .get_account_private_key(sid, "pw1", &account, "acctpw")
            .await
            .unwrap();
        let restored = Keypair::from_private_key_hex(&key).unwrap();
        assert_eq!(restored.address(), account.address());
    }

    #[tokio::test]
    async fn private_key_import_and_replace_semantics() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();
        let owner = teller.unlock_vault("pw1").await.unwrap();
        let sid = Some(owner.id());

        let keypair = Keypair::generate();
        let imported = teller
            .create_account_from_private_key(
                sid,
                "pw1",
                new_account("Imported"),
                keypair.private_key(),
                false,
            )
            .await
            .unwrap();
        assert_eq!(imported.address(), keypair.address());

        // same key again without replace: duplicate address
        let err = teller
            .create_account_from_private_key(
                sid,
                "pw1",
                new_account("Duplicate"),
                keypair.private_key(),
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::AccountExists { .. }));

        // with replace: swapped in place, id retained
        let replaced = teller
            .create_account_from_private_key(
                sid,
                "pw1",
                new_account("Replacement"),
                keypair.private_key(),
                true,
            )
            .await
            .unwrap();
        assert_eq!(replaced.id(), imported.id());
        assert_eq!(replaced.name(), "Replacement");
    }

    #[tokio::test]
    async fn recovery_phrase_accounts_are_deterministic() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();
        let owner = teller.unlock_vault("pw1").await.unwrap();
        let sid = Some(owner.id());

        teller
            .create_account_from_recovery_phrase(
                sid,
                "pw1",
                new_account("Recovered"),
                RECOVERY_PHRASE,
                None,
            )
            .await
            .unwrap();

        // the same phrase derives the same address, so a second import
        // collides
        let err = teller
            .create_account_from_recovery_phrase(
                sid,
                "pw1",
                new_account("Recovered again"),
                RECOVERY_PHRASE,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::AccountExists { .. }));
    }

    #[tokio::test]
    async fn invalid_recovery_phrase_is_a_caller_error() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();
        let owner = teller.unlock_vault("pw1").await.unwrap();

        let err = teller
            .create_account_from_recovery_phrase(
                Some(owner.id()),
                "pw1",
                new_account("Bad"),
                "abandon abandon abandon",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn external_authorization_requires_an_unlocked_vault() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();

        let request = external_request(6000);
        let err = teller.authorize_external(&request).await.unwrap_err();
        assert!(matches!(err, VaultError::NotUnlocked));

        teller.unlock_vault("pw1").await.unwrap();
        let session = teller.authorize_external(&request).await.unwrap();
        assert_eq!(session.max_age(), 6000);
        assert_eq!(
            session.origin().map(|o| o.value()),
            Some("https://example.com")
        );
    }

    #[tokio::test]
    async fn zero_max_age_external_requests_get_the_default() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();
        teller.unlock_vault("pw1").await.unwrap();

        let session = teller
            .authorize_external(&external_request(0))
            .await
            .unwrap();
        assert_eq!(
            session.max_age(),
            TellerConfig::default().external_session_max_age_secs
        );
    }

    fn external_request(max_age: u64) -> ExternalAccessRequest {
        let permissions = PermissionsBuilder::new()
            .for_resource(Resource::Account)
            .allow("read")
            .on_any()
            .build();
        ExternalAccessRequest::new(
            permissions,
            max_age,
            OriginReference::new("https://example.com").unwrap(),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn session_checks_fire_in_order() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();
        let owner = teller.unlock_vault("pw1").await.unwrap();

        let missing = teller.list_sessions(None).await.unwrap_err();
        assert!(matches!(
            missing,
            VaultError::Unauthorized(UnauthorizedReason::MissingSessionId)
        ));

        let unknown = teller.list_sessions(Some("nope")).await.unwrap_err();
        assert!(matches!(
            unknown,
            VaultError::Unauthorized(UnauthorizedReason::UnknownSessionId)
        ));

        // a scoped session without session permissions is refused
        let external = teller
            .authorize_external(&external_request(6000))
            .await
            .unwrap();
        let lacking = teller.list_sessions(Some(external.id())).await.unwrap_err();
        assert!(matches!(
            lacking,
            VaultError::Unauthorized(UnauthorizedReason::NotAllowed)
        ));

        // a revoked session fails the validity check
        teller
            .revoke_session(Some(owner.id()), external.id())
            .await
            .unwrap();
        let after_revoke = teller
            .list_sessions(Some(external.id()))
            .await
            .unwrap_err();
        assert!(matches!(
            after_revoke,
            VaultError::Unauthorized(UnauthorizedReason::InvalidSession)
        ));

        // the owner passes all four checks
        let sessions = teller.list_sessions(Some(owner.id())).await.unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[tokio::test]
    async fn revocation_is_idempotent_and_visible() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();
        let owner = teller.unlock_vault("pw1").await.unwrap();
        let external = teller
            .authorize_external(&external_request(6000))
            .await
            .unwrap();

        assert!(teller.is_session_valid(Some(external.id())).await);
        teller
            .revoke_session(Some(owner.id()), external.id())
            .await
            .unwrap();
        assert!(!teller.is_session_valid(Some(external.id())).await);

        // second revoke: no error, record still present
        teller
            .revoke_session(Some(owner.id()), external.id())
            .await
            .unwrap();
        let sessions = teller.list_sessions(Some(owner.id())).await.unwrap();
        assert_eq!(sessions.len(), 2);

        assert!(!teller.is_session_valid(None).await);
        assert!(!teller.is_session_valid(Some("unknown")).await);
    }

    #[tokio::test]
    async fn account_passphrase_failures_trip_the_lockout() {
        let teller = test_teller_with(TellerConfig {
            max_passphrase_attempts: 3,
            ..TellerConfig::default()
        });
        teller.initialize_vault("pw1").await.unwrap();
        let owner = teller.unlock_vault("pw1").await.unwrap();
        let sid = Some(owner.id());
        let account = teller
            .create_account(sid, "pw1", new_account("Target"))
            .await
            .unwrap();

        for _ in 0..2 {
            let err = teller
                .get_account_private_key(sid, "pw1", &account, "wrong")
                .await
                .unwrap_err();
            assert!(err.is_account_password_wrong());
            assert!(teller.is_unlocked());
        }

        // third consecutive failure force-locks, with no explicit lock call
        let _ = teller
            .get_account_private_key(sid, "pw1", &account, "wrong")
            .await
            .unwrap_err();
        assert!(!teller.is_unlocked());
    }

    #[tokio::test]
    async fn cached_passphrase_unlocks_until_locked() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();

        // a wrong passphrase is never cached
        let err = teller.remember_passphrase("wrong").await.unwrap_err();
        assert!(err.is_vault_password_wrong());
        assert!(matches!(
            teller.unlock_from_cache().await.unwrap_err(),
            VaultError::PassphraseRequired
        ));

        teller.remember_passphrase("pw1").await.unwrap();
        let session = teller.unlock_from_cache().await.unwrap();
        assert!(teller.is_unlocked());
        assert_eq!(session.max_age(), 0);

        // locking clears the cache along with the vault
        teller.lock_vault();
        assert!(matches!(
            teller.unlock_from_cache().await.unwrap_err(),
            VaultError::PassphraseRequired
        ));
    }

    #[tokio::test]
    async fn first_run_walkthrough_survives_relock() {
        init_tracing();
        let teller = test_teller();

        teller.initialize_vault("hunter2!").await.unwrap();
        let owner = teller.unlock_vault("hunter2!").await.unwrap();
        let account = teller
            .create_account(Some(owner.id()), "hunter2!", new_account("Main"))
            .await
            .unwrap();

        teller.lock_vault();
        assert!(!teller.is_unlocked());

        // the account comes back from the encrypted blob, not from memory
        let owner2 = teller.unlock_vault("hunter2!").await.unwrap();
        let key = teller
            .get_account_private_key(Some(owner2.id()), "hunter2!", &account, "acctpw")
            .await
            .unwrap();
        assert!(Keypair::from_private_key_hex(&key).is_ok());

        // both owner sessions remain on record, oldest first
        let sessions = teller.list_sessions(Some(owner2.id())).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].created_at() <= sessions[1].created_at());
    }

    #[tokio::test]
    async fn vault_lockout_trips_at_exactly_the_threshold() {
        init_tracing();
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();
        teller.unlock_vault("pw1").await.unwrap();
        teller.remember_passphrase("pw1").await.unwrap();

        for _ in 0..3 {
            let _ = teller.unlock_vault("wrong").await.unwrap_err();
            assert!(teller.is_unlocked());
        }

        // fourth consecutive failure: force-locked, cache dropped
        let err = teller.unlock_vault("wrong").await.unwrap_err();
        assert!(err.is_vault_password_wrong());
        assert!(!teller.is_unlocked());
        assert!(matches!(
            teller.unlock_from_cache().await.unwrap_err(),
            VaultError::PassphraseRequired
        ));

        // counters were cleared along with the lock
        teller.unlock_vault("pw1").await.unwrap();
        assert!(teller.is_unlocked());
    }

    #[tokio::test]
    async fn a_correct_passphrase_resets_the_failure_count() {
        let teller = test_teller();
        teller.initialize_vault("pw1").await.unwrap();

        for round in 0..2 {
            for _ in 0..3 {
                let _ = teller.unlock_vault("wrong").await.unwrap_err();
            }
            teller.unlock_vault("pw1").await.unwrap();
            assert!(teller.is_unlocked(), "round {round}");
        }
    }
}
