mod accounts;
mod media;
mod profiles;

use crate::error::Error;
use nostr_types::PublicKeyHex;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::spawn_blocking;

// setting: key -> value
//   general key/value pairs (settings, the active account)
//
// user_account: pubkey -> UserAccount
//   data: serde_json::to_string(account) | serde_json::from_str(data)
//
// profile_data: owner_id -> ProfileData
//   newest metadata event only, data as serde_json
//
// media_resource: url -> MediaResource
//   CDN variants of media, variants as serde_json
const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS setting (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS user_account (
    pubkey TEXT PRIMARY KEY NOT NULL,
    data TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS profile_data (
    owner_id TEXT PRIMARY KEY NOT NULL,
    event_id TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    data TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS media_resource (
    url TEXT PRIMARY KEY NOT NULL,
    event_id TEXT,
    content_type TEXT,
    variants TEXT NOT NULL
);
";

/// The persistent store. Cheap to clone; all clones share one SQLite
/// connection. Only one thread at a time uses it.
#[derive(Clone)]
pub struct Storage {
    db: Arc<Mutex<Connection>>,

    // Pubkeys whose profile_data row was just written
    profile_changes: broadcast::Sender<PublicKeyHex>,
}

impl Storage {
    /// Open (or create) the database file at `path`
    pub fn open(path: &Path) -> Result<Storage, Error> {
        let connection = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
                | OpenFlags::SQLITE_OPEN_NOFOLLOW,
        )?;

        // Performance:
        connection.pragma_update(None, "journal_mode", "WAL")?;
        connection.pragma_update(None, "synchronous", "normal")?;
        connection.pragma_update(None, "temp_store", "memory")?;

        Self::setup(connection)
    }

    /// A database that lives only as long as this `Storage`
    pub fn open_in_memory() -> Result<Storage, Error> {
        Self::setup(Connection::open_in_memory()?)
    }

    fn setup(connection: Connection) -> Result<Storage, Error> {
        connection.pragma_update(None, "foreign_keys", "ON")?;
        connection.execute_batch(SCHEMA)?;

        let (profile_changes, _) = broadcast::channel(256);
        Ok(Storage {
            db: Arc::new(Mutex::new(connection)),
            profile_changes,
        })
    }

    /// Run `f` against the connection on the blocking pool
    pub(crate) async fn with_db<F, T>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Connection) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        spawn_blocking(move || {
            let mut db = db.blocking_lock();
            f(&mut db)
        })
        .await?
    }

    pub async fn read_setting(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_owned();
        self.with_db(move |db| {
            let mut stmt = db.prepare("SELECT value FROM setting WHERE key = ?")?;
            let value: Option<String> = stmt.query_row([key], |row| row.get(0)).optional()?;
            Ok(value)
        })
        .await
    }

    pub async fn write_setting(&self, key: &str, value: String) -> Result<(), Error> {
        let key = key.to_owned();
        self.with_db(move |db| {
            let mut stmt = db.prepare(
                "INSERT INTO setting (key, value) VALUES (?, ?) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )?;
            stmt.execute((key, value))?;
            Ok(())
        })
        .await
    }

    pub async fn delete_setting(&self, key: &str) -> Result<(), Error> {
        let key = key.to_owned();
        self.with_db(move |db| {
            db.execute("DELETE FROM setting WHERE key = ?", [key])?;
            Ok(())
        })
        .await
    }

    /// Read a u64 setting, falling back to `default` if it was never written
    /// or does not parse
    pub async fn read_setting_u64_or_default(&self, key: &str, default: u64) -> Result<u64, Error> {
        Ok(match self.read_setting(key).await? {
            Some(value) => match value.parse::<u64>() {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("Setting {} is not a number ({}), using default", key, e);
                    default
                }
            },
            None => default,
        })
    }

    /// Hold the connection, stalling every database call until dropped
    #[cfg(test)]
    pub(crate) async fn lock_db(&self) -> tokio::sync::OwnedMutexGuard<Connection> {
        self.db.clone().lock_owned().await
    }

    /// Get told about every profile_data write (by owner pubkey)
    pub fn subscribe_profile_changes(&self) -> broadcast::Receiver<PublicKeyHex> {
        self.profile_changes.subscribe()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.read_setting("x").await.unwrap(), None);

        storage.write_setting("x", "1".to_owned()).await.unwrap();
        storage.write_setting("x", "2".to_owned()).await.unwrap();
        assert_eq!(storage.read_setting("x").await.unwrap().as_deref(), Some("2"));

        storage.delete_setting("x").await.unwrap();
        assert_eq!(storage.read_setting("x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_u64_setting_default() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.read_setting_u64_or_default("n", 5).await.unwrap(), 5);

        storage.write_setting("n", "garbage".to_owned()).await.unwrap();
        assert_eq!(storage.read_setting_u64_or_default("n", 5).await.unwrap(), 5);

        storage.write_setting("n", "12".to_owned()).await.unwrap();
        assert_eq!(storage.read_setting_u64_or_default("n", 5).await.unwrap(), 12);
    }
}
