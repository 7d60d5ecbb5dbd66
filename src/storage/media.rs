use super::Storage;
use crate::error::Error;
use crate::metadata::MediaResource;
use rusqlite::OptionalExtension;

impl Storage {
    /// Upsert media resources, replacing anything stored for the same url
    pub async fn write_media_resources(&self, resources: Vec<MediaResource>) -> Result<(), Error> {
        if resources.is_empty() {
            return Ok(());
        }

        let mut rows: Vec<(String, Option<String>, Option<String>, String)> =
            Vec::with_capacity(resources.len());
        for r in resources {
            let variants = serde_json::to_string(&r.variants)?;
            rows.push((r.url, r.event_id, r.content_type, variants));
        }

        self.with_db(move |db| {
            let tx = db.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "REPLACE INTO media_resource (url, event_id, content_type, variants) \
                     VALUES (?, ?, ?, ?)",
                )?;
                for row in rows {
                    stmt.execute(row)?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn read_media_resource(&self, url: &str) -> Result<Option<MediaResource>, Error> {
        let url = url.to_owned();
        self.with_db(move |db| {
            let mut stmt = db.prepare(
                "SELECT url, event_id, content_type, variants FROM media_resource WHERE url = ?",
            )?;
            let row: Option<(String, Option<String>, Option<String>, String)> = stmt
                .query_row([url], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })
                .optional()?;
            Ok(match row {
                Some((url, event_id, content_type, variants)) => Some(MediaResource {
                    url,
                    event_id,
                    content_type,
                    variants: serde_json::from_str(&variants)?,
                }),
                None => None,
            })
        })
        .await
    }
}
