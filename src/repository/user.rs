use crate::accounts::{
    NostrWalletConnect, UserAccount, UserAccountFetcher, UserContacts, WalletPreference,
};
use crate::error::{Error, ErrorKind};
use crate::globals::Globals;
use crate::metadata::{ContentMetadata, ProfileMetadata};
use nostr_types::PublicKeyHex;
use std::collections::HashMap;
use std::sync::Arc;

/// Accounts of people who log in on this device: creating them, keeping them
/// in sync with the network, and editing the profile behind them.
pub struct UserRepository {
    globals: Arc<Globals>,
    fetcher: UserAccountFetcher,
}

impl UserRepository {
    pub fn new(globals: Arc<Globals>) -> UserRepository {
        UserRepository {
            fetcher: UserAccountFetcher::new(globals.clone()),
            globals,
        }
    }

    pub async fn create_new_user_account(
        &self,
        user_id: &PublicKeyHex,
    ) -> Result<UserAccount, Error> {
        self.globals
            .accounts
            .upsert_account(UserAccount::build_local(user_id.clone()))
            .await
    }

    /// Fetch the profile and contact list of `user_id` and merge whatever
    /// arrived into the stored account
    pub async fn fetch_and_update_user_account(
        &self,
        user_id: &PublicKeyHex,
    ) -> Result<UserAccount, Error> {
        let (profile, contacts) = futures::join!(
            self.fetcher.fetch_user_profile_or_none(user_id),
            self.fetcher.fetch_user_contacts_or_none(user_id),
        );
        let stats = profile.as_ref().and_then(|p| p.complete_stats());

        let account = self
            .globals
            .accounts
            .get_and_update_account(user_id, |account| {
                account.copy_if_not_null(profile.as_ref(), stats, contacts.as_ref())
            })
            .await?;

        tracing::debug!(
            "Synced account {} (profile: {}, stats: {}, contacts: {})",
            user_id.as_str(),
            profile.is_some(),
            stats.is_some(),
            contacts.is_some()
        );
        Ok(account)
    }

    pub async fn update_contacts(
        &self,
        user_id: &PublicKeyHex,
        contacts: UserContacts,
    ) -> Result<UserAccount, Error> {
        self.globals
            .accounts
            .get_and_update_account(user_id, |account| {
                account.copy_contacts_if_not_null(Some(&contacts))
            })
            .await
    }

    pub async fn connect_nostr_wallet(
        &self,
        user_id: &PublicKeyHex,
        wallet: NostrWalletConnect,
    ) -> Result<UserAccount, Error> {
        self.globals
            .accounts
            .get_and_update_account(user_id, |account| UserAccount {
                nostr_wallet: Some(wallet),
                ..account
            })
            .await
    }

    pub async fn disconnect_nostr_wallet(
        &self,
        user_id: &PublicKeyHex,
    ) -> Result<UserAccount, Error> {
        self.globals
            .accounts
            .get_and_update_account(user_id, |account| UserAccount {
                nostr_wallet: None,
                ..account
            })
            .await
    }

    pub async fn update_wallet_preference(
        &self,
        user_id: &PublicKeyHex,
        wallet_preference: WalletPreference,
    ) -> Result<UserAccount, Error> {
        self.globals
            .accounts
            .get_and_update_account(user_id, |account| UserAccount {
                wallet_preference,
                ..account
            })
            .await
    }

    pub async fn update_primal_wallet_balance(
        &self,
        user_id: &PublicKeyHex,
        balance_in_btc: String,
    ) -> Result<UserAccount, Error> {
        self.globals
            .accounts
            .get_and_update_account(user_id, |account| UserAccount {
                primal_wallet_balance_in_btc: Some(balance_in_btc),
                ..account
            })
            .await
    }

    /// Logout of everything
    pub async fn remove_all_user_accounts(&self) -> Result<(), Error> {
        self.globals.accounts.clear_all_accounts().await
    }

    /// Publish an edited profile. Local media is uploaded first (picture,
    /// then banner); if any upload fails nothing is published and the stored
    /// account is left alone.
    pub async fn set_profile_metadata(
        &self,
        user_id: &PublicKeyHex,
        metadata: ProfileMetadata,
    ) -> Result<UserAccount, Error> {
        let picture = match metadata.local_picture_uri {
            Some(uri) => Some(self.upload(user_id, &uri).await?),
            None => metadata.remote_picture_url,
        };
        let banner = match metadata.local_banner_uri {
            Some(uri) => Some(self.upload(user_id, &uri).await?),
            None => metadata.remote_banner_url,
        };

        let content = ContentMetadata {
            name: metadata.username,
            display_name: metadata.display_name,
            about: metadata.about,
            picture,
            banner,
            website: metadata.website,
            lud16: metadata.lightning_address,
            nip05: metadata.nostr_verification,
            extra: Default::default(),
        };

        self.set_user_profile_and_update_locally(user_id, content)
            .await
    }

    /// Change only the lightning address of the profile as the network
    /// currently has it
    pub async fn set_lightning_address(
        &self,
        user_id: &PublicKeyHex,
        lightning_address: String,
    ) -> Result<UserAccount, Error> {
        // Fresh from the network; a locally cached copy could be stale and we
        // would clobber someone's edit from another client.
        let published = self
            .globals
            .request(self.globals.source.get_user_profile(user_id))
            .await?;
        let content = match published.and_then(|p| p.content_metadata()) {
            Some(content) => content,
            None => return Err(ErrorKind::ProfileMetadataNotFound.into()),
        };

        let content = ContentMetadata {
            lud16: Some(lightning_address),
            ..content
        };

        self.set_user_profile_and_update_locally(user_id, content)
            .await
    }

    async fn upload(&self, user_id: &PublicKeyHex, local_uri: &str) -> Result<String, Error> {
        let url = self
            .globals
            .upload(self.globals.uploader.upload_file(user_id, local_uri))
            .await?;
        tracing::debug!("Uploaded {} to {}", local_uri, url);
        Ok(url)
    }

    async fn set_user_profile_and_update_locally(
        &self,
        user_id: &PublicKeyHex,
        content: ContentMetadata,
    ) -> Result<UserAccount, Error> {
        let published = self
            .globals
            .request(self.globals.source.set_user_profile(user_id, &content))
            .await?;

        // Everything below comes from what was published, not from `content`
        let profile_data = published.as_profile_data(&HashMap::new());
        self.globals
            .storage
            .write_profiles(vec![profile_data.clone()])
            .await?;

        self.globals
            .accounts
            .get_and_update_account(user_id, |account| UserAccount {
                author_display_name: profile_data.author_name_ui_friendly(),
                user_display_name: profile_data.username_ui_friendly(),
                avatar_cdn_image: profile_data.avatar_cdn_image.clone(),
                internet_identifier: profile_data.internet_identifier.clone(),
                lightning_address: profile_data.lightning_address.clone(),
                ..account
            })
            .await
    }
}
