use crate::names;
use nostr_types::{Metadata, PublicKeyHex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

const DISPLAY_NAME: &str = "display_name";
const BANNER: &str = "banner";
const WEBSITE: &str = "website";
const LUD16: &str = "lud16";

/// The kind-0 profile document, with the fields we care about lifted out of
/// `Metadata::other`. Any other keys someone else put there are carried along
/// in `extra` so that re-publishing does not drop them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentMetadata {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub about: Option<String>,
    pub picture: Option<String>,
    pub banner: Option<String>,
    pub website: Option<String>,
    pub lud16: Option<String>,
    pub nip05: Option<String>,
    pub extra: Map<String, Value>,
}

impl ContentMetadata {
    /// Parse the content of a metadata event
    pub fn from_json(content: &str) -> Result<ContentMetadata, serde_json::Error> {
        let metadata: Metadata = serde_json::from_str(content)?;
        Ok(metadata.into())
    }

    /// Parse the content of a metadata event, None if it isn't there or isn't valid
    pub fn from_json_or_none(content: Option<&str>) -> Option<ContentMetadata> {
        let content = content?;
        match ContentMetadata::from_json(content) {
            Ok(md) => Some(md),
            Err(e) => {
                tracing::warn!("Invalid profile metadata: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Metadata::from(self.clone()))
    }
}

fn take_string(other: &mut Map<String, Value>, key: &str) -> Option<String> {
    match other.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(value) => {
            // Not a string. Leave it alone for whoever wrote it.
            other.insert(key.to_owned(), value);
            None
        }
        None => None,
    }
}

impl From<Metadata> for ContentMetadata {
    fn from(metadata: Metadata) -> ContentMetadata {
        let mut other = metadata.other;
        ContentMetadata {
            name: metadata.name,
            display_name: take_string(&mut other, DISPLAY_NAME),
            about: metadata.about,
            picture: metadata.picture,
            banner: take_string(&mut other, BANNER),
            website: take_string(&mut other, WEBSITE),
            lud16: take_string(&mut other, LUD16),
            nip05: metadata.nip05,
            extra: other,
        }
    }
}

impl From<ContentMetadata> for Metadata {
    fn from(content: ContentMetadata) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.name = content.name;
        metadata.about = content.about;
        metadata.picture = content.picture;
        metadata.nip05 = content.nip05;
        metadata.other = content.extra;
        let lifted = [
            (DISPLAY_NAME, content.display_name),
            (BANNER, content.banner),
            (WEBSITE, content.website),
            (LUD16, content.lud16),
        ];
        for (key, value) in lifted {
            if let Some(value) = value {
                metadata.other.insert(key.to_owned(), Value::String(value));
            }
        }
        metadata
    }
}

/// What the user typed into the profile editor
#[derive(Debug, Clone, Default)]
pub struct ProfileMetadata {
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub website: Option<String>,
    pub about: Option<String>,
    pub lightning_address: Option<String>,
    pub nostr_verification: Option<String>,

    /// A picture still on this device, to be uploaded before publishing
    pub local_picture_uri: Option<String>,
    pub remote_picture_url: Option<String>,

    /// A banner still on this device, to be uploaded before publishing
    pub local_banner_uri: Option<String>,
    pub remote_banner_url: Option<String>,
}

/// A published metadata event (kind 0), as returned by relays or by publishing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedMetadata {
    pub id: String,
    pub pubkey: PublicKeyHex,
    pub created_at: i64,
    pub content: String,
}

impl PublishedMetadata {
    pub fn content_metadata(&self) -> Option<ContentMetadata> {
        ContentMetadata::from_json_or_none(Some(&self.content))
    }

    /// Project into the stored profile record, resolving image urls against
    /// any CDN variants we know about
    pub fn as_profile_data(&self, cdn_resources: &HashMap<String, MediaResource>) -> ProfileData {
        let md = self.content_metadata().unwrap_or_default();
        let cdn_image = |url: Option<String>| {
            url.map(|source_url| CdnImage {
                variants: cdn_resources
                    .get(&source_url)
                    .map(|r| r.variants.clone())
                    .unwrap_or_default(),
                source_url,
            })
        };

        ProfileData {
            owner_id: self.pubkey.clone(),
            event_id: self.id.clone(),
            created_at: self.created_at,
            raw: self.content.clone(),
            handle: md.name,
            display_name: md.display_name,
            internet_identifier: md.nip05,
            lightning_address: md.lud16,
            about: md.about,
            website: md.website,
            avatar_cdn_image: cdn_image(md.picture),
            banner_cdn_image: cdn_image(md.banner),
        }
    }
}

/// One resized rendition of an image on the CDN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnResourceVariant {
    pub width: u32,
    pub height: u32,
    pub media_url: String,
}

/// An image by its original url plus whatever renditions the CDN has
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnImage {
    pub source_url: String,
    pub variants: Vec<CdnResourceVariant>,
}

impl CdnImage {
    pub fn new(source_url: String) -> CdnImage {
        CdnImage {
            source_url,
            variants: vec![],
        }
    }
}

/// CDN knowledge about one media url
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResource {
    pub url: String,
    pub event_id: Option<String>,
    pub content_type: Option<String>,
    pub variants: Vec<CdnResourceVariant>,
}

/// Stored projection of someone's latest metadata event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub owner_id: PublicKeyHex,
    pub event_id: String,
    pub created_at: i64,
    pub raw: String,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub internet_identifier: Option<String>,
    pub lightning_address: Option<String>,
    pub about: Option<String>,
    pub website: Option<String>,
    pub avatar_cdn_image: Option<CdnImage>,
    pub banner_cdn_image: Option<CdnImage>,
}

impl ProfileData {
    pub fn author_name_ui_friendly(&self) -> String {
        names::author_name_ui_friendly(
            self.display_name.as_deref(),
            self.handle.as_deref(),
            &self.owner_id,
        )
    }

    pub fn username_ui_friendly(&self) -> String {
        names::username_ui_friendly(self.handle.as_deref(), &self.owner_id)
    }
}
