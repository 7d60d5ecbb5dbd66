use super::UserAccount;
use crate::error::{Error, ErrorKind};
use crate::storage::Storage;
use dashmap::DashMap;
use nostr_types::PublicKeyHex;
use parking_lot::RwLock as PRwLock;
use std::collections::HashMap;
use tokio::sync::{watch, Mutex};

const ACTIVE_ACCOUNT_KEY: &str = "active_account";

/// All accounts that have logged in on this device, one of which may be
/// active.
///
/// Every mutation goes through `get_and_update_account` (or the whole-record
/// calls built on the same lock), so concurrent updates apply one after the
/// other and none is lost.
pub struct UserAccountsStore {
    storage: Storage,

    // Held across read, transform, persist and publish. This is the only
    // place accounts are written.
    accounts: Mutex<HashMap<PublicKeyHex, UserAccount>>,

    // Only written while `accounts` is locked
    active_id: PRwLock<Option<PublicKeyHex>>,

    active: watch::Sender<Option<UserAccount>>,

    // Per-account observers, created on demand
    observers: DashMap<PublicKeyHex, watch::Sender<Option<UserAccount>>>,
}

impl UserAccountsStore {
    /// Load all stored accounts and the active account
    pub async fn load(storage: Storage) -> Result<UserAccountsStore, Error> {
        let mut accounts: HashMap<PublicKeyHex, UserAccount> = HashMap::new();
        for account in storage.read_all_accounts().await? {
            accounts.insert(account.pubkey.clone(), account);
        }

        let active_id = match storage.read_setting(ACTIVE_ACCOUNT_KEY).await? {
            Some(s) => match PublicKeyHex::try_from_str(&s) {
                Ok(pk) if accounts.contains_key(&pk) => Some(pk),
                _ => {
                    tracing::warn!("Stored active account {} is not usable, ignoring", s);
                    None
                }
            },
            None => None,
        };

        let active_account = active_id.as_ref().and_then(|pk| accounts.get(pk).cloned());
        let (active, _) = watch::channel(active_account);

        tracing::debug!("Loaded {} user accounts", accounts.len());

        Ok(UserAccountsStore {
            storage,
            accounts: Mutex::new(accounts),
            active_id: PRwLock::new(active_id),
            active,
            observers: DashMap::new(),
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub async fn get(&self, pubkey: &PublicKeyHex) -> Option<UserAccount> {
        self.accounts.lock().await.get(pubkey).cloned()
    }

    pub async fn all(&self) -> Vec<UserAccount> {
        self.accounts.lock().await.values().cloned().collect()
    }

    /// Watch one account. The receiver starts with the current value.
    pub async fn observe(&self, pubkey: &PublicKeyHex) -> watch::Receiver<Option<UserAccount>> {
        // Under the lock so no update slips between reading and subscribing
        let accounts = self.accounts.lock().await;
        let current = accounts.get(pubkey).cloned();
        self.observers
            .entry(pubkey.clone())
            .or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }

    /// Watch whichever account is active
    pub fn observe_active(&self) -> watch::Receiver<Option<UserAccount>> {
        self.active.subscribe()
    }

    pub fn active_id(&self) -> Option<PublicKeyHex> {
        self.active_id.read().clone()
    }

    /// Atomically read, transform and store an account. An account we don't
    /// know yet starts out as `UserAccount::build_local`.
    ///
    /// The reducer must be a pure transformation; it runs with the store
    /// locked.
    pub async fn get_and_update_account<F>(
        &self,
        pubkey: &PublicKeyHex,
        reducer: F,
    ) -> Result<UserAccount, Error>
    where
        F: FnOnce(UserAccount) -> UserAccount,
    {
        let mut accounts = self.accounts.lock().await;
        let current = accounts
            .get(pubkey)
            .cloned()
            .unwrap_or_else(|| UserAccount::build_local(pubkey.clone()));

        let mut updated = reducer(current);
        updated.pubkey = pubkey.clone();

        self.store(&mut accounts, updated).await
    }

    /// Insert or replace a whole account record
    pub async fn upsert_account(&self, account: UserAccount) -> Result<UserAccount, Error> {
        let mut accounts = self.accounts.lock().await;
        self.store(&mut accounts, account).await
    }

    async fn store(
        &self,
        accounts: &mut HashMap<PublicKeyHex, UserAccount>,
        account: UserAccount,
    ) -> Result<UserAccount, Error> {
        // Memory and observers first: if we are cancelled while the blocking
        // write is in flight, that write still lands, and everyone already
        // sees what it wrote.
        let previous = accounts.insert(account.pubkey.clone(), account.clone());
        self.publish(&account.pubkey, Some(account.clone()));

        if let Err(e) = self.storage.write_account(&account).await {
            match previous {
                Some(ref previous) => accounts.insert(previous.pubkey.clone(), previous.clone()),
                None => accounts.remove(&account.pubkey),
            };
            self.publish(&account.pubkey, previous);
            return Err(e);
        }

        Ok(account)
    }

    fn publish(&self, pubkey: &PublicKeyHex, account: Option<UserAccount>) {
        if self.active_id.read().as_ref() == Some(pubkey) {
            self.active.send_replace(account.clone());
        }
        if let Some(sender) = self.observers.get(pubkey) {
            sender.send_replace(account);
        }
    }

    /// Make a stored account the active one. Exactly one account is active
    /// afterwards.
    pub async fn set_active_account(&self, pubkey: &PublicKeyHex) -> Result<(), Error> {
        let accounts = self.accounts.lock().await;
        let account = match accounts.get(pubkey) {
            Some(a) => a.clone(),
            None => return Err(ErrorKind::AccountNotFound(pubkey.as_str().to_owned()).into()),
        };

        self.storage
            .write_setting(ACTIVE_ACCOUNT_KEY, pubkey.as_str().to_owned())
            .await?;
        *self.active_id.write() = Some(pubkey.clone());
        self.active.send_replace(Some(account));

        tracing::debug!("Active account is now {}", pubkey.as_str());
        Ok(())
    }

    /// Forget every account (logout)
    pub async fn clear_all_accounts(&self) -> Result<(), Error> {
        let mut accounts = self.accounts.lock().await;

        self.storage
            .delete_all_accounts(&[ACTIVE_ACCOUNT_KEY])
            .await?;

        accounts.clear();
        *self.active_id.write() = None;
        self.active.send_replace(None);
        for sender in self.observers.iter() {
            sender.value().send_replace(None);
        }

        Ok(())
    }
}
