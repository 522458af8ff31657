use std::path::PathBuf;

use anyhow::Result;
use rusqlite::params;
use tracing::{debug, instrument};

use super::Database;
use crate::changelog::ChangeEntry;

impl Database {
    /// Append change-log entries in order
    #[instrument(skip_all, fields(count = entries.len()))]
    pub fn append_changes(&self, entries: &[ChangeEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        self.begin_transaction()?;
        match self.write_changes(entries) {
            Ok(()) => {
                self.commit()?;
                debug!("changes appended");
                Ok(())
            }
            Err(e) => {
                self.rollback()?;
                Err(e)
            }
        }
    }

    fn write_changes(&self, entries: &[ChangeEntry]) -> Result<()> {
        let mut stmt = self.connection().prepare(
            "INSERT INTO change_log (directory, old_name, new_name, timestamp) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for entry in entries {
            stmt.execute(params![
                entry.dir.to_string_lossy(),
                entry.old_name,
                entry.new_name,
                entry.timestamp
            ])?;
        }
        Ok(())
    }

    /// Get the stored change log, oldest first. `limit` keeps only the newest entries.
    pub fn get_change_log(&self, limit: Option<usize>) -> Result<Vec<ChangeEntry>> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self.connection().prepare(
            "SELECT directory, old_name, new_name, timestamp FROM (
                 SELECT id, directory, old_name, new_name, timestamp FROM change_log
                 ORDER BY id DESC LIMIT ?1
             ) ORDER BY id",
        )?;

        let entries = stmt
            .query_map([limit], |row| {
                Ok(ChangeEntry {
                    dir: PathBuf::from(row.get::<_, String>(0)?),
                    old_name: row.get(1)?,
                    new_name: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Number of stored change-log entries
    pub fn change_log_len(&self) -> Result<usize> {
        let count: i64 = self
            .connection()
            .query_row("SELECT COUNT(*) FROM change_log", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
