use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

/// Database wrapper for a photo library's store
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Create in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tags (
                position INTEGER PRIMARY KEY,
                name TEXT UNIQUE NOT NULL
            );

            CREATE TABLE IF NOT EXISTS photos (
                id INTEGER PRIMARY KEY,
                directory TEXT NOT NULL,
                name TEXT NOT NULL,
                base_name TEXT NOT NULL,
                extension TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS photo_tags (
                photo_id INTEGER NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                tag TEXT NOT NULL,
                PRIMARY KEY (photo_id, position)
            );

            CREATE TABLE IF NOT EXISTS photo_history (
                photo_id INTEGER NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                PRIMARY KEY (photo_id, position)
            );

            CREATE TABLE IF NOT EXISTS change_log (
                id INTEGER PRIMARY KEY,
                directory TEXT NOT NULL,
                old_name TEXT NOT NULL,
                new_name TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_photo_tags_tag ON photo_tags(tag);
            CREATE INDEX IF NOT EXISTS idx_change_log_timestamp ON change_log(timestamp);
            "#,
        )?;
        Ok(())
    }

    /// Get a reference to the underlying connection (for testing)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit the current transaction
    pub fn commit(&self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback the current transaction
    pub fn rollback(&self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_in_memory_database() {
        let db = Database::open_in_memory().expect("Failed to create database");

        let tables: Vec<String> = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for table in ["meta", "tags", "photos", "photo_tags", "photo_history", "change_log"] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn test_tag_names_are_unique() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute("INSERT INTO tags (position, name) VALUES (0, 'Apple')", [])
            .unwrap();

        let result = db
            .conn
            .execute("INSERT INTO tags (position, name) VALUES (1, 'Apple')", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_open_is_idempotent() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("store.db");

        Database::open(&path).unwrap();
        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_rollback_discards_writes() {
        let db = Database::open_in_memory().unwrap();
        db.begin_transaction().unwrap();
        db.conn
            .execute("INSERT INTO meta (key, value) VALUES ('k', 'v')", [])
            .unwrap();
        db.rollback().unwrap();

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM meta", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
