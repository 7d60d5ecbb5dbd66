use super::UserRepository;
use crate::accounts::UserAccount;
use crate::error::Error;
use crate::globals::Globals;
use crate::metadata::{MediaResource, ProfileData};
use crate::source::UserListResponse;
use futures::stream::{BoxStream, StreamExt};
use nostr_types::PublicKeyHex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Other people's profiles, and our relationship to them
pub struct ProfileRepository {
    globals: Arc<Globals>,
    users: UserRepository,
}

impl ProfileRepository {
    pub fn new(globals: Arc<Globals>) -> ProfileRepository {
        ProfileRepository {
            users: UserRepository::new(globals.clone()),
            globals,
        }
    }

    /// Who follows `profile_id`, best ranked first
    pub async fn fetch_followers(
        &self,
        profile_id: &PublicKeyHex,
    ) -> Result<Vec<ProfileData>, Error> {
        let response = self
            .globals
            .request(self.globals.source.fetch_followers(profile_id))
            .await?;
        self.store_user_list(response).await
    }

    /// Who `profile_id` follows, best ranked first
    pub async fn fetch_following(
        &self,
        profile_id: &PublicKeyHex,
    ) -> Result<Vec<ProfileData>, Error> {
        let response = self
            .globals
            .request(self.globals.source.fetch_following(profile_id))
            .await?;
        self.store_user_list(response).await
    }

    async fn store_user_list(&self, response: UserListResponse) -> Result<Vec<ProfileData>, Error> {
        let cdn_resources: HashMap<String, MediaResource> = response
            .cdn_resources
            .iter()
            .map(|r| (r.url.clone(), r.clone()))
            .collect();
        let profiles: Vec<ProfileData> = response
            .profiles
            .iter()
            .map(|p| p.as_profile_data(&cdn_resources))
            .collect();

        self.globals
            .storage
            .write_media_resources(response.cdn_resources)
            .await?;
        self.globals.storage.write_profiles(profiles.clone()).await?;

        Ok(profiles)
    }

    pub async fn follow(
        &self,
        user_id: &PublicKeyHex,
        followed_user_id: &PublicKeyHex,
    ) -> Result<UserAccount, Error> {
        let contacts = self
            .globals
            .request(self.globals.source.publish_follow(user_id, followed_user_id))
            .await?;
        tracing::debug!("{} now follows {}", user_id.as_str(), followed_user_id.as_str());
        self.users.update_contacts(user_id, contacts).await
    }

    pub async fn unfollow(
        &self,
        user_id: &PublicKeyHex,
        unfollowed_user_id: &PublicKeyHex,
    ) -> Result<UserAccount, Error> {
        let contacts = self
            .globals
            .request(self.globals.source.publish_unfollow(user_id, unfollowed_user_id))
            .await?;
        tracing::debug!(
            "{} no longer follows {}",
            user_id.as_str(),
            unfollowed_user_id.as_str()
        );
        self.users.update_contacts(user_id, contacts).await
    }

    /// The stored profile of `profile_id`, now (if we have it) and after every
    /// write of it
    pub fn observe_profile_data(
        &self,
        profile_id: &PublicKeyHex,
    ) -> BoxStream<'static, ProfileData> {
        let storage = self.globals.storage.clone();
        // Subscribe before the first read so no write can fall in between
        let changes = storage.subscribe_profile_changes();
        let profile_id = profile_id.clone();

        futures::stream::unfold(
            (storage, changes, profile_id, true),
            |(storage, mut changes, profile_id, initial)| async move {
                let mut initial = initial;
                loop {
                    if !initial {
                        match changes.recv().await {
                            Ok(owner) if owner == profile_id => {}
                            Ok(_) => continue,
                            Err(RecvError::Lagged(n)) => {
                                tracing::debug!("Profile change stream skipped {} changes", n);
                            }
                            Err(RecvError::Closed) => return None,
                        }
                    }
                    initial = false;

                    match storage.read_profile(&profile_id).await {
                        Ok(Some(profile)) => {
                            return Some((profile, (storage, changes, profile_id, false)))
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("{}", e),
                    }
                }
            },
        )
        .boxed()
    }
}
