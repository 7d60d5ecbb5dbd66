use crate::error::Error;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// How long a relay fetch or publish may take before it counts as a
    /// transport failure
    pub request_timeout_secs: u64,

    /// How long a single media upload may take
    pub upload_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            upload_timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub async fn load(storage: &Storage) -> Result<Settings, Error> {
        let request_timeout_secs = storage
            .read_setting_u64_or_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)
            .await?;

        let upload_timeout_secs = storage
            .read_setting_u64_or_default("upload_timeout_secs", DEFAULT_UPLOAD_TIMEOUT_SECS)
            .await?;

        Ok(Settings {
            request_timeout_secs,
            upload_timeout_secs,
        })
    }

    pub async fn save(&self, storage: &Storage) -> Result<(), Error> {
        storage
            .write_setting("request_timeout_secs", self.request_timeout_secs.to_string())
            .await?;
        storage
            .write_setting("upload_timeout_secs", self.upload_timeout_secs.to_string())
            .await?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_settings_load_save() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(Settings::load(&storage).await.unwrap(), Settings::default());

        let settings = Settings {
            request_timeout_secs: 5,
            upload_timeout_secs: 600,
        };
        settings.save(&storage).await.unwrap();
        assert_eq!(Settings::load(&storage).await.unwrap(), settings);
    }
}
