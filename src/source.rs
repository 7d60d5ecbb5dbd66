use crate::accounts::UserContacts;
use crate::error::Error;
use crate::metadata::{ContentMetadata, MediaResource, PublishedMetadata};
use async_trait::async_trait;
use nostr_types::PublicKeyHex;

/// Follower/following/note counts as reported by the network. Any of them
/// may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileStats {
    pub followers_count: Option<u32>,
    pub following_count: Option<u32>,
    pub notes_count: Option<u32>,
}

/// Someone's profile as the network knows it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfileResponse {
    pub metadata: Option<PublishedMetadata>,
    pub stats: Option<ProfileStats>,
    pub cdn_resources: Vec<MediaResource>,
}

/// A list of people (followers or following), in the order the network
/// ranks them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserListResponse {
    pub profiles: Vec<PublishedMetadata>,
    pub cdn_resources: Vec<MediaResource>,
}

/// Everything we need from relays. Implementations report failures as
/// `ErrorKind::Wss` (transport), `ErrorKind::NostrPublish` (the relays did
/// not take our event) or `ErrorKind::MissingRelays` (nowhere to publish).
#[async_trait]
pub trait ProfileDataSource: Send + Sync {
    async fn fetch_user_profile(
        &self,
        pubkey: &PublicKeyHex,
    ) -> Result<Option<UserProfileResponse>, Error>;

    async fn fetch_user_contacts(&self, pubkey: &PublicKeyHex)
        -> Result<Option<UserContacts>, Error>;

    async fn fetch_followers(&self, pubkey: &PublicKeyHex) -> Result<UserListResponse, Error>;

    async fn fetch_following(&self, pubkey: &PublicKeyHex) -> Result<UserListResponse, Error>;

    /// Add `target` to `viewer`'s contact list and publish it. Returns the
    /// contact list as published.
    async fn publish_follow(
        &self,
        viewer: &PublicKeyHex,
        target: &PublicKeyHex,
    ) -> Result<UserContacts, Error>;

    /// Remove `target` from `viewer`'s contact list and publish it. Returns
    /// the contact list as published.
    async fn publish_unfollow(
        &self,
        viewer: &PublicKeyHex,
        target: &PublicKeyHex,
    ) -> Result<UserContacts, Error>;

    /// The latest metadata event for `pubkey`, straight from the network
    async fn get_user_profile(&self, pubkey: &PublicKeyHex)
        -> Result<Option<PublishedMetadata>, Error>;

    /// Sign and publish a metadata event. Returns the event as published.
    async fn set_user_profile(
        &self,
        owner: &PublicKeyHex,
        metadata: &ContentMetadata,
    ) -> Result<PublishedMetadata, Error>;
}

/// Puts local media somewhere public
#[async_trait]
pub trait FileUploader: Send + Sync {
    /// Upload the file at `local_uri` on behalf of `owner`. Failures are
    /// reported as `ErrorKind::UnsuccessfulFileUpload`.
    async fn upload_file(&self, owner: &PublicKeyHex, local_uri: &str) -> Result<String, Error>;
}
