//! Persistable form of the manager's vocabulary and photo registry.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::photo::PhotoId;

/// Everything needed to rebuild a [`crate::Manager`] with its invariants intact.
///
/// Tag reverse indices are not stored; they are derived from the photos' tag
/// sets when the snapshot is adopted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub next_photo_id: u64,
    /// Vocabulary in insertion order.
    pub tags: Vec<String>,
    /// Registry in registration order.
    pub photos: Vec<PhotoRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: PhotoId,
    pub dir: PathBuf,
    pub base: String,
    pub extension: String,
    pub name: String,
    pub tags: Vec<String>,
    pub history: Vec<String>,
}
