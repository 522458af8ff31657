use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, instrument};

use super::Database;
use crate::photo::PhotoId;
use crate::snapshot::{PhotoRecord, Snapshot};

const NEXT_PHOTO_ID_KEY: &str = "next_photo_id";

impl Database {
    /// Replace the stored vocabulary and registry with `snapshot`.
    #[instrument(skip_all, fields(tags = snapshot.tags.len(), photos = snapshot.photos.len()))]
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.begin_transaction()?;
        match self.write_snapshot(snapshot) {
            Ok(()) => self.commit(),
            Err(e) => {
                self.rollback()?;
                Err(e)
            }
        }
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let conn = self.connection();
        conn.execute_batch(
            "DELETE FROM photo_history; DELETE FROM photo_tags; DELETE FROM photos; DELETE FROM tags;",
        )?;

        conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![NEXT_PHOTO_ID_KEY, snapshot.next_photo_id.to_string()],
        )?;

        let mut insert_tag = conn.prepare("INSERT INTO tags (position, name) VALUES (?1, ?2)")?;
        for (position, name) in snapshot.tags.iter().enumerate() {
            insert_tag.execute(params![position as i64, name])?;
        }

        let mut insert_photo = conn.prepare(
            "INSERT INTO photos (id, directory, name, base_name, extension) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut insert_photo_tag =
            conn.prepare("INSERT INTO photo_tags (photo_id, position, tag) VALUES (?1, ?2, ?3)")?;
        let mut insert_history =
            conn.prepare("INSERT INTO photo_history (photo_id, position, name) VALUES (?1, ?2, ?3)")?;

        for photo in &snapshot.photos {
            let id = photo.id.0 as i64;
            insert_photo.execute(params![
                id,
                photo.dir.to_string_lossy(),
                photo.name,
                photo.base,
                photo.extension
            ])?;
            for (position, tag) in photo.tags.iter().enumerate() {
                insert_photo_tag.execute(params![id, position as i64, tag])?;
            }
            for (position, name) in photo.history.iter().enumerate() {
                insert_history.execute(params![id, position as i64, name])?;
            }
        }

        debug!("snapshot written");
        Ok(())
    }

    /// Read back the last saved snapshot. `None` if nothing was ever saved.
    #[instrument(skip(self))]
    pub fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        let conn = self.connection();
        let next_photo_id: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                [NEXT_PHOTO_ID_KEY],
                |row| row.get(0),
            )
            .optional()?;
        let Some(next_photo_id) = next_photo_id else {
            return Ok(None);
        };
        let next_photo_id: u64 = next_photo_id
            .parse()
            .with_context(|| format!("Invalid next photo id in store: {next_photo_id}"))?;

        let tags: Vec<String> = conn
            .prepare("SELECT name FROM tags ORDER BY position")?
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut photo_tags =
            self.ordered_names("SELECT photo_id, tag FROM photo_tags ORDER BY photo_id, position")?;
        let mut history =
            self.ordered_names("SELECT photo_id, name FROM photo_history ORDER BY photo_id, position")?;

        let mut stmt = conn.prepare(
            "SELECT id, directory, name, base_name, extension FROM photos ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut photos = Vec::new();
        for row in rows {
            let (id, directory, name, base, extension) = row?;
            photos.push(PhotoRecord {
                id: PhotoId(id as u64),
                dir: PathBuf::from(directory),
                base,
                extension,
                name,
                tags: photo_tags.remove(&id).unwrap_or_default(),
                history: history.remove(&id).unwrap_or_default(),
            });
        }

        debug!(tags = tags.len(), photos = photos.len(), "snapshot loaded");
        Ok(Some(Snapshot {
            next_photo_id,
            tags,
            photos,
        }))
    }

    /// Group `(photo_id, text)` rows by photo, keeping row order.
    fn ordered_names(&self, sql: &str) -> Result<HashMap<i64, Vec<String>>> {
        let mut stmt = self.connection().prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut result: HashMap<i64, Vec<String>> = HashMap::new();
        for row in rows {
            let (photo_id, value) = row?;
            result.entry(photo_id).or_default().push(value);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Manager;
    use std::path::Path;

    #[test]
    fn test_load_from_empty_store() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_snapshot().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_manager() {
        let db = Database::open_in_memory().unwrap();
        let mut manager = Manager::new();
        manager.add_tag("Unused");
        manager.set_photo_tag_set("img.jpg", Path::new("2024/summer"), &["Apple", "Banana"]);
        manager.delete_tag("Apple");
        manager.get_or_create_photo("plain.png", Path::new(""));

        db.save_snapshot(&manager.snapshot()).unwrap();
        let loaded = db.load_snapshot().unwrap().unwrap();
        assert_eq!(loaded, manager.snapshot());

        let restored = Manager::from_snapshot(loaded).unwrap();
        restored.verify().unwrap();
        let photo = restored.find_photo("img@Banana.jpg", Path::new("2024/summer")).unwrap();
        assert_eq!(
            photo.history().iter().collect::<Vec<_>>(),
            vec!["img.jpg", "img@Apple@Banana.jpg"]
        );
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let db = Database::open_in_memory().unwrap();
        let mut manager = Manager::new();
        manager.set_photo_tag_set("a.jpg", Path::new(""), &["X"]);
        db.save_snapshot(&manager.snapshot()).unwrap();

        let fresh = Manager::new();
        db.save_snapshot(&fresh.snapshot()).unwrap();

        let loaded = db.load_snapshot().unwrap().unwrap();
        assert!(loaded.tags.is_empty());
        assert!(loaded.photos.is_empty());
    }

    #[test]
    fn test_corrupt_counter_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute(
                "INSERT INTO meta (key, value) VALUES ('next_photo_id', 'many')",
                [],
            )
            .unwrap();
        assert!(db.load_snapshot().is_err());
    }
}
