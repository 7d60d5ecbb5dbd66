use super::Storage;
use crate::error::Error;
use crate::metadata::ProfileData;
use nostr_types::PublicKeyHex;
use rusqlite::OptionalExtension;

impl Storage {
    /// Upsert profiles. An older event never replaces a newer one.
    pub async fn write_profiles(&self, profiles: Vec<ProfileData>) -> Result<(), Error> {
        if profiles.is_empty() {
            return Ok(());
        }

        let mut rows: Vec<(String, String, i64, String)> = Vec::with_capacity(profiles.len());
        for p in profiles.iter() {
            rows.push((
                p.owner_id.as_str().to_owned(),
                p.event_id.clone(),
                p.created_at,
                serde_json::to_string(p)?,
            ));
        }

        self.with_db(move |db| {
            let tx = db.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO profile_data (owner_id, event_id, created_at, data) \
                     VALUES (?, ?, ?, ?) \
                     ON CONFLICT(owner_id) DO UPDATE SET \
                     event_id = excluded.event_id, created_at = excluded.created_at, \
                     data = excluded.data \
                     WHERE excluded.created_at >= profile_data.created_at",
                )?;
                for row in rows {
                    stmt.execute(row)?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await?;

        for p in profiles {
            // nobody listening is fine
            let _ = self.profile_changes.send(p.owner_id);
        }

        Ok(())
    }

    pub async fn read_profile(
        &self,
        owner_id: &PublicKeyHex,
    ) -> Result<Option<ProfileData>, Error> {
        let owner_id = owner_id.as_str().to_owned();
        self.with_db(move |db| {
            let mut stmt = db.prepare("SELECT data FROM profile_data WHERE owner_id = ?")?;
            let data: Option<String> = stmt.query_row([owner_id], |row| row.get(0)).optional()?;
            Ok(match data {
                Some(data) => Some(serde_json::from_str(&data)?),
                None => None,
            })
        })
        .await
    }
}
