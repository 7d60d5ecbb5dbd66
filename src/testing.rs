//! Fakes for the network side, for tests

use crate::accounts::UserContacts;
use crate::error::{Error, ErrorKind};
use crate::globals::Globals;
use crate::metadata::{ContentMetadata, PublishedMetadata};
use crate::source::{FileUploader, ProfileDataSource, UserListResponse, UserProfileResponse};
use crate::storage::Storage;
use async_trait::async_trait;
use nostr_types::PublicKeyHex;
use parking_lot::Mutex as PMutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

pub(crate) fn pk(n: u8) -> PublicKeyHex {
    PublicKeyHex::try_from_str(&format!("{:064x}", n)).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fail {
    Wss,
    Publish,
    MissingRelays,
}

impl Fail {
    fn error(self) -> Error {
        match self {
            Fail::Wss => ErrorKind::Wss("connection reset".to_owned()).into(),
            Fail::Publish => ErrorKind::NostrPublish("rejected by all relays".to_owned()).into(),
            Fail::MissingRelays => ErrorKind::MissingRelays("no write relays".to_owned()).into(),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeSource {
    pub profiles: PMutex<HashMap<PublicKeyHex, UserProfileResponse>>,
    pub contacts: PMutex<HashMap<PublicKeyHex, UserContacts>>,
    pub followers: PMutex<HashMap<PublicKeyHex, UserListResponse>>,
    pub following: PMutex<HashMap<PublicKeyHex, UserListResponse>>,
    pub metadata: PMutex<HashMap<PublicKeyHex, PublishedMetadata>>,

    /// Make every publish (follow, unfollow, profile) fail this way
    pub fail_publish: PMutex<Option<Fail>>,

    /// Make every fetch fail this way
    pub fail_fetch: PMutex<Option<Fail>>,

    /// If set, follow/unfollow publishes wait for a permit
    pub publish_gate: PMutex<Option<Arc<Semaphore>>>,

    /// Notified whenever a follow/unfollow publish starts
    pub publish_started: Arc<Notify>,

    /// If set, follower/following fetches wait for a permit
    pub list_gate: PMutex<Option<Arc<Semaphore>>>,

    /// How many follower/following fetches have started
    pub list_fetches: PMutex<usize>,

    pub publishes: PMutex<Vec<(PublicKeyHex, PublicKeyHex, bool)>>,
    pub set_profile_calls: PMutex<Vec<ContentMetadata>>,
    next_event: PMutex<i64>,
}

impl FakeSource {
    pub fn gate_publishes(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.publish_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn gate_list_fetches(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.list_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn published_metadata(
        &self,
        owner: &PublicKeyHex,
        md: &ContentMetadata,
    ) -> PublishedMetadata {
        let mut next = self.next_event.lock();
        *next += 1;
        PublishedMetadata {
            id: format!("{:064x}", *next),
            pubkey: owner.clone(),
            created_at: 1_700_000_000 + *next,
            content: md.to_json().unwrap(),
        }
    }

    fn check_fetch(&self) -> Result<(), Error> {
        match *self.fail_fetch.lock() {
            Some(fail) => Err(fail.error()),
            None => Ok(()),
        }
    }

    async fn start_list_fetch(&self) -> Result<(), Error> {
        *self.list_fetches.lock() += 1;
        let gate = self.list_gate.lock().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        self.check_fetch()
    }

    fn check_publish(&self) -> Result<(), Error> {
        match *self.fail_publish.lock() {
            Some(fail) => Err(fail.error()),
            None => Ok(()),
        }
    }

    async fn publish_contacts(
        &self,
        viewer: &PublicKeyHex,
        target: &PublicKeyHex,
        follow: bool,
    ) -> Result<UserContacts, Error> {
        self.publish_started.notify_one();
        let gate = self.publish_gate.lock().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        self.check_publish()?;

        self.publishes
            .lock()
            .push((viewer.clone(), target.clone(), follow));
        let mut contacts = self.contacts.lock();
        let list = contacts.entry(viewer.clone()).or_default();
        if follow {
            list.following.insert(target.clone());
        } else {
            list.following.remove(target);
        }
        Ok(list.clone())
    }
}

#[async_trait]
impl ProfileDataSource for FakeSource {
    async fn fetch_user_profile(
        &self,
        pubkey: &PublicKeyHex,
    ) -> Result<Option<UserProfileResponse>, Error> {
        self.check_fetch()?;
        Ok(self.profiles.lock().get(pubkey).cloned())
    }

    async fn fetch_user_contacts(
        &self,
        pubkey: &PublicKeyHex,
    ) -> Result<Option<UserContacts>, Error> {
        self.check_fetch()?;
        Ok(self.contacts.lock().get(pubkey).cloned())
    }

    async fn fetch_followers(&self, pubkey: &PublicKeyHex) -> Result<UserListResponse, Error> {
        self.start_list_fetch().await?;
        Ok(self.followers.lock().get(pubkey).cloned().unwrap_or_default())
    }

    async fn fetch_following(&self, pubkey: &PublicKeyHex) -> Result<UserListResponse, Error> {
        self.start_list_fetch().await?;
        Ok(self.following.lock().get(pubkey).cloned().unwrap_or_default())
    }

    async fn publish_follow(
        &self,
        viewer: &PublicKeyHex,
        target: &PublicKeyHex,
    ) -> Result<UserContacts, Error> {
        self.publish_contacts(viewer, target, true).await
    }

    async fn publish_unfollow(
        &self,
        viewer: &PublicKeyHex,
        target: &PublicKeyHex,
    ) -> Result<UserContacts, Error> {
        self.publish_contacts(viewer, target, false).await
    }

    async fn get_user_profile(
        &self,
        pubkey: &PublicKeyHex,
    ) -> Result<Option<PublishedMetadata>, Error> {
        self.check_fetch()?;
        Ok(self.metadata.lock().get(pubkey).cloned())
    }

    async fn set_user_profile(
        &self,
        owner: &PublicKeyHex,
        metadata: &ContentMetadata,
    ) -> Result<PublishedMetadata, Error> {
        self.check_publish()?;
        self.set_profile_calls.lock().push(metadata.clone());
        let published = self.published_metadata(owner, metadata);
        self.metadata.lock().insert(owner.clone(), published.clone());
        Ok(published)
    }
}

#[derive(Default)]
pub(crate) struct FakeUploader {
    /// Local uris that fail to upload
    pub failing: PMutex<Vec<String>>,
    pub uploaded: PMutex<Vec<String>>,
}

#[async_trait]
impl FileUploader for FakeUploader {
    async fn upload_file(&self, _owner: &PublicKeyHex, local_uri: &str) -> Result<String, Error> {
        if self.failing.lock().iter().any(|u| u == local_uri) {
            return Err(ErrorKind::UnsuccessfulFileUpload(format!("{} failed", local_uri)).into());
        }
        self.uploaded.lock().push(local_uri.to_owned());
        let name = local_uri.rsplit('/').next().unwrap_or(local_uri);
        Ok(format!("https://blossom.example.com/{}", name))
    }
}

pub(crate) async fn globals(
    source: Arc<FakeSource>,
    uploader: Arc<FakeUploader>,
) -> Arc<Globals> {
    Globals::new(Storage::open_in_memory().unwrap(), source, uploader)
        .await
        .unwrap()
}
