use super::Storage;
use crate::accounts::UserAccount;
use crate::error::Error;
use nostr_types::PublicKeyHex;
use rusqlite::OptionalExtension;

impl Storage {
    pub async fn write_account(&self, account: &UserAccount) -> Result<(), Error> {
        let pubkey = account.pubkey.as_str().to_owned();
        let data = serde_json::to_string(account)?;
        self.with_db(move |db| {
            let mut stmt = db.prepare(
                "INSERT INTO user_account (pubkey, data) VALUES (?, ?) \
                 ON CONFLICT(pubkey) DO UPDATE SET data = excluded.data",
            )?;
            stmt.execute((pubkey, data))?;
            Ok(())
        })
        .await
    }

    pub async fn read_account(&self, pubkey: &PublicKeyHex) -> Result<Option<UserAccount>, Error> {
        let pubkey = pubkey.as_str().to_owned();
        self.with_db(move |db| {
            let mut stmt = db.prepare("SELECT data FROM user_account WHERE pubkey = ?")?;
            let data: Option<String> = stmt.query_row([pubkey], |row| row.get(0)).optional()?;
            Ok(match data {
                Some(data) => Some(serde_json::from_str(&data)?),
                None => None,
            })
        })
        .await
    }

    pub async fn read_all_accounts(&self) -> Result<Vec<UserAccount>, Error> {
        self.with_db(|db| {
            let mut stmt = db.prepare("SELECT data FROM user_account ORDER BY pubkey")?;
            let mut rows = stmt.query([])?;
            let mut output: Vec<UserAccount> = Vec::new();
            while let Some(row) = rows.next()? {
                let data: String = row.get(0)?;
                match serde_json::from_str(&data) {
                    Ok(account) => output.push(account),
                    // just skip over records we can no longer read
                    Err(e) => tracing::warn!("Skipping unreadable account: {}", e),
                }
            }
            Ok(output)
        })
        .await
    }

    /// Delete every account together with the listed setting rows, all or
    /// nothing
    pub async fn delete_all_accounts(&self, setting_keys: &[&str]) -> Result<(), Error> {
        let setting_keys: Vec<String> = setting_keys.iter().map(|k| (*k).to_owned()).collect();
        self.with_db(move |db| {
            let tx = db.transaction()?;
            tx.execute("DELETE FROM user_account", [])?;
            for key in setting_keys {
                tx.execute("DELETE FROM setting WHERE key = ?", [key])?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }
}
