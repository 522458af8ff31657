//! Append-only record of every rename the manager performs.

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Display format for change timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M.%S";

/// One rename, as seen by the change-log viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub dir: PathBuf,
    pub old_name: String,
    pub new_name: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChangeEntry {
    pub fn new(dir: PathBuf, old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            dir,
            old_name: old_name.into(),
            new_name: new_name.into(),
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Timestamp in local time, or the raw seconds if out of range.
    pub fn formatted_timestamp(&self) -> String {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0)
            .map(|t| t.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| self.timestamp.to_string())
    }
}

/// In-memory change log. Entries past the saved cursor still need flushing
/// to the store.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    entries: Vec<ChangeEntry>,
    saved: usize,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: ChangeEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    /// Entries recorded since the last [`ChangeLog::mark_saved`].
    pub fn unsaved(&self) -> &[ChangeEntry] {
        &self.entries[self.saved..]
    }

    pub fn mark_saved(&mut self) {
        self.saved = self.entries.len();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
