use crate::accounts::{ActiveAccountStore, UserAccountsStore};
use crate::error::Error;
use crate::settings::Settings;
use crate::source::{FileUploader, ProfileDataSource};
use crate::storage::Storage;
use parking_lot::RwLock as PRwLock;
use std::future::Future;
use std::sync::Arc;

/// State shared by every repository and screen. Create one per client with
/// `Globals::new` and hand it around as an `Arc`.
pub struct Globals {
    /// Settings
    pub settings: PRwLock<Settings>,

    /// The database
    pub storage: Storage,

    /// All accounts that have logged in on this device
    pub accounts: Arc<UserAccountsStore>,

    /// Where profiles, contact lists and follower lists come from and go to
    pub source: Arc<dyn ProfileDataSource>,

    /// Where local media goes before it can be referenced in a profile
    pub uploader: Arc<dyn FileUploader>,
}

impl Globals {
    /// Load settings and accounts from `storage`
    pub async fn new(
        storage: Storage,
        source: Arc<dyn ProfileDataSource>,
        uploader: Arc<dyn FileUploader>,
    ) -> Result<Arc<Globals>, Error> {
        let settings = Settings::load(&storage).await?;
        let accounts = UserAccountsStore::load(storage.clone()).await?;

        Ok(Arc::new(Globals {
            settings: PRwLock::new(settings),
            storage,
            accounts: Arc::new(accounts),
            source,
            uploader,
        }))
    }

    pub fn active_account_store(&self) -> ActiveAccountStore {
        ActiveAccountStore::new(self.accounts.clone())
    }

    /// Run a relay request, failing with `ErrorKind::Timeout` if it takes
    /// longer than the configured request timeout
    pub(crate) async fn request<T, F>(&self, request: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        let timeout = self.settings.read().request_timeout();
        tokio::time::timeout(timeout, request).await?
    }

    /// Like `request`, with the upload timeout
    pub(crate) async fn upload<T, F>(&self, upload: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        let timeout = self.settings.read().upload_timeout();
        tokio::time::timeout(timeout, upload).await?
    }
}
