use crate::metadata::CdnImage;
use crate::names;
use nostr_types::PublicKeyHex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A relay from someone's contact list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySetting {
    pub url: String,
    pub read: bool,
    pub write: bool,
}

/// Unread counters shown on the app bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badges {
    pub unread_notifications_count: u32,
    pub unread_messages_count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletPreference {
    #[default]
    Undefined,
    PrimalWallet,
    NostrWalletConnect,
}

/// A NIP-47 wallet connection
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NostrWalletConnect {
    pub relays: Vec<String>,
    pub pubkey: String,
    pub lightning_address: Option<String>,
    pub secret: String,
}

impl fmt::Debug for NostrWalletConnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NostrWalletConnect")
            .field("relays", &self.relays)
            .field("pubkey", &self.pubkey)
            .field("lightning_address", &self.lightning_address)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Follower/following/note counts, only ever handled as a complete set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    pub followers_count: u32,
    pub following_count: u32,
    pub notes_count: u32,
}

/// Profile fields of an account as freshly fetched from the network
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileSnapshot {
    pub author_display_name: String,
    pub user_display_name: String,
    pub avatar_cdn_image: Option<CdnImage>,
    pub internet_identifier: Option<String>,
    pub lightning_address: Option<String>,
    pub followers_count: Option<u32>,
    pub following_count: Option<u32>,
    pub notes_count: Option<u32>,
}

impl ProfileSnapshot {
    /// The stats, but only if all three counts came in. A partial set is
    /// worse than none: a missing count would otherwise be stored as zero.
    pub fn complete_stats(&self) -> Option<UserStats> {
        match (self.followers_count, self.following_count, self.notes_count) {
            (Some(followers_count), Some(following_count), Some(notes_count)) => Some(UserStats {
                followers_count,
                following_count,
                notes_count,
            }),
            _ => None,
        }
    }
}

/// Someone's contact list (kind 3)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContacts {
    pub following: HashSet<PublicKeyHex>,
    pub interests: Vec<String>,
    pub relays: Vec<RelaySetting>,
}

/// Everything we remember about an account that has logged in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub pubkey: PublicKeyHex,
    pub author_display_name: String,
    pub user_display_name: String,
    pub avatar_cdn_image: Option<CdnImage>,
    pub internet_identifier: Option<String>,
    pub lightning_address: Option<String>,
    pub followers_count: Option<u32>,
    pub following_count: Option<u32>,
    pub notes_count: Option<u32>,

    #[serde(default)]
    pub relays: Vec<RelaySetting>,

    #[serde(default)]
    pub following: HashSet<PublicKeyHex>,

    #[serde(default)]
    pub interests: Vec<String>,

    #[serde(default)]
    pub nostr_wallet: Option<NostrWalletConnect>,

    #[serde(default)]
    pub wallet_preference: WalletPreference,

    #[serde(default)]
    pub primal_wallet_balance_in_btc: Option<String>,

    #[serde(default)]
    pub badges: Badges,
}

impl UserAccount {
    /// A fresh account knowing nothing but its key
    pub fn build_local(pubkey: PublicKeyHex) -> UserAccount {
        let short = names::pubkey_short(&pubkey);
        UserAccount {
            pubkey,
            author_display_name: short.clone(),
            user_display_name: short,
            avatar_cdn_image: None,
            internet_identifier: None,
            lightning_address: None,
            followers_count: None,
            following_count: None,
            notes_count: None,
            relays: vec![],
            following: HashSet::new(),
            interests: vec![],
            nostr_wallet: None,
            wallet_preference: WalletPreference::default(),
            primal_wallet_balance_in_btc: None,
            badges: Badges::default(),
        }
    }

    /// Merge fetched data into this account. Anything absent in the fetch
    /// keeps its stored value.
    pub fn copy_if_not_null(
        self,
        profile: Option<&ProfileSnapshot>,
        stats: Option<UserStats>,
        contacts: Option<&UserContacts>,
    ) -> UserAccount {
        self.copy_profile_if_not_null(profile)
            .copy_stats_if_not_null(stats)
            .copy_contacts_if_not_null(contacts)
    }

    pub fn copy_profile_if_not_null(self, profile: Option<&ProfileSnapshot>) -> UserAccount {
        let profile = match profile {
            Some(p) => p,
            None => return self,
        };

        UserAccount {
            author_display_name: profile.author_display_name.clone(),
            user_display_name: profile.user_display_name.clone(),
            avatar_cdn_image: profile.avatar_cdn_image.clone().or(self.avatar_cdn_image),
            internet_identifier: profile
                .internet_identifier
                .clone()
                .or(self.internet_identifier),
            lightning_address: profile.lightning_address.clone().or(self.lightning_address),
            ..self
        }
    }

    pub fn copy_stats_if_not_null(self, stats: Option<UserStats>) -> UserAccount {
        match stats {
            Some(stats) => UserAccount {
                followers_count: Some(stats.followers_count),
                following_count: Some(stats.following_count),
                notes_count: Some(stats.notes_count),
                ..self
            },
            None => self,
        }
    }

    /// Take the contact list. The following count is derived from the new
    /// set, not trusted from any remote count.
    pub fn copy_contacts_if_not_null(self, contacts: Option<&UserContacts>) -> UserAccount {
        let contacts = match contacts {
            Some(c) => c,
            None => return self,
        };

        // Contact lists frequently come without relays; don't lose ours
        let relays = if contacts.relays.is_empty() {
            self.relays
        } else {
            contacts.relays.clone()
        };

        UserAccount {
            following_count: Some(contacts.following.len() as u32),
            following: contacts.following.clone(),
            interests: contacts.interests.clone(),
            relays,
            ..self
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pk(n: u8) -> PublicKeyHex {
        PublicKeyHex::try_from_str(&format!("{:064x}", n)).unwrap()
    }

    fn stored() -> UserAccount {
        let mut account = UserAccount::build_local(pk(1));
        account.author_display_name = "Alice".to_owned();
        account.avatar_cdn_image = Some(CdnImage::new("https://a/alice.png".to_owned()));
        account.lightning_address = Some("alice@ln.tips".to_owned());
        account.followers_count = Some(7);
        account.following_count = Some(2);
        account.notes_count = Some(30);
        account.relays = vec![RelaySetting {
            url: "wss://relay.example.com".to_owned(),
            read: true,
            write: true,
        }];
        account
    }

    #[test]
    fn test_build_local() {
        let account = UserAccount::build_local(pk(9));
        assert_eq!(account.pubkey, pk(9));
        assert!(account.following.is_empty());
        assert_eq!(account.followers_count, None);
        assert_eq!(account.author_display_name, names::pubkey_short(&pk(9)));
    }

    #[test]
    fn test_complete_stats() {
        let mut profile = ProfileSnapshot {
            followers_count: Some(5),
            following_count: None,
            notes_count: Some(10),
            ..Default::default()
        };
        assert_eq!(profile.complete_stats(), None);

        profile.following_count = Some(5);
        assert_eq!(
            profile.complete_stats(),
            Some(UserStats {
                followers_count: 5,
                following_count: 5,
                notes_count: 10
            })
        );
    }

    #[test]
    fn test_profile_merge_keeps_absent_fields() {
        let profile = ProfileSnapshot {
            author_display_name: "Alice A.".to_owned(),
            user_display_name: "alice".to_owned(),
            internet_identifier: Some("alice@example.com".to_owned()),
            ..Default::default()
        };
        let merged = stored().copy_if_not_null(Some(&profile), None, None);
        assert_eq!(merged.author_display_name, "Alice A.");
        assert_eq!(merged.internet_identifier.as_deref(), Some("alice@example.com"));
        assert_eq!(merged.avatar_cdn_image, stored().avatar_cdn_image);
        assert_eq!(merged.lightning_address, stored().lightning_address);
        assert_eq!(merged.followers_count, Some(7));
    }

    #[test]
    fn test_nothing_fetched_changes_nothing() {
        assert_eq!(stored().copy_if_not_null(None, None, None), stored());
    }

    #[test]
    fn test_contacts_recompute_following_count() {
        let contacts = UserContacts {
            following: [pk(2), pk(3), pk(4)].into_iter().collect(),
            interests: vec!["nostr".to_owned()],
            relays: vec![],
        };
        let stats = UserStats {
            followers_count: 100,
            following_count: 99,
            notes_count: 1000,
        };
        let merged = stored().copy_if_not_null(None, Some(stats), Some(&contacts));
        assert_eq!(merged.following_count, Some(3));
        assert_eq!(merged.followers_count, Some(100));
        assert_eq!(merged.interests, vec!["nostr".to_owned()]);
        assert_eq!(merged.relays, stored().relays);
    }

    #[test]
    fn test_wallet_secret_not_in_debug() {
        let nwc = NostrWalletConnect {
            relays: vec!["wss://relay.getalby.com/v1".to_owned()],
            pubkey: "69effe7b".to_owned(),
            lightning_address: None,
            secret: "topsecret".to_owned(),
        };
        assert!(!format!("{:?}", nwc).contains("topsecret"));
    }
}
