use super::{UserAccount, UserAccountsStore};
use crate::error::{Error, ErrorKind};
use nostr_types::PublicKeyHex;
use std::sync::Arc;
use tokio::sync::watch;

/// The logged-in account, as seen by screens
#[derive(Clone)]
pub struct ActiveAccountStore {
    accounts: Arc<UserAccountsStore>,
}

impl ActiveAccountStore {
    pub fn new(accounts: Arc<UserAccountsStore>) -> ActiveAccountStore {
        ActiveAccountStore { accounts }
    }

    pub fn active_user_id(&self) -> Result<PublicKeyHex, Error> {
        match self.accounts.active_id() {
            Some(pk) => Ok(pk),
            None => Err(ErrorKind::NoActiveAccount.into()),
        }
    }

    /// The active account now and every time it changes
    pub fn active_user_account(&self) -> watch::Receiver<Option<UserAccount>> {
        self.accounts.observe_active()
    }

    pub async fn set_active_account(&self, pubkey: &PublicKeyHex) -> Result<(), Error> {
        self.accounts.set_active_account(pubkey).await
    }
}
