use super::{ProfileSnapshot, UserContacts};
use crate::globals::Globals;
use crate::metadata::MediaResource;
use nostr_types::PublicKeyHex;
use std::collections::HashMap;
use std::sync::Arc;

/// Fetches the pieces of an account from the network. Failures are logged
/// and reported as "nothing fetched", so a merge simply keeps what it had.
pub struct UserAccountFetcher {
    globals: Arc<Globals>,
}

impl UserAccountFetcher {
    pub fn new(globals: Arc<Globals>) -> UserAccountFetcher {
        UserAccountFetcher { globals }
    }

    pub async fn fetch_user_profile_or_none(
        &self,
        pubkey: &PublicKeyHex,
    ) -> Option<ProfileSnapshot> {
        let response = match self
            .globals
            .request(self.globals.source.fetch_user_profile(pubkey))
            .await
        {
            Ok(Some(response)) => response,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Fetching profile of {} failed: {}", pubkey.as_str(), e);
                return None;
            }
        };

        let metadata = response.metadata?;
        let cdn_resources: HashMap<String, MediaResource> = response
            .cdn_resources
            .into_iter()
            .map(|r| (r.url.clone(), r))
            .collect();
        let profile_data = metadata.as_profile_data(&cdn_resources);
        let stats = response.stats.unwrap_or_default();

        Some(ProfileSnapshot {
            author_display_name: profile_data.author_name_ui_friendly(),
            user_display_name: profile_data.username_ui_friendly(),
            avatar_cdn_image: profile_data.avatar_cdn_image,
            internet_identifier: profile_data.internet_identifier,
            lightning_address: profile_data.lightning_address,
            followers_count: stats.followers_count,
            following_count: stats.following_count,
            notes_count: stats.notes_count,
        })
    }

    pub async fn fetch_user_contacts_or_none(&self, pubkey: &PublicKeyHex) -> Option<UserContacts> {
        match self
            .globals
            .request(self.globals.source.fetch_user_contacts(pubkey))
            .await
        {
            Ok(contacts) => contacts,
            Err(e) => {
                tracing::warn!("Fetching contacts of {} failed: {}", pubkey.as_str(), e);
                None
            }
        }
    }
}
