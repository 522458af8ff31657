use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::naming::{render_name, split_extension};

/// Sequence id assigned to a photo when it is first registered. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhotoId(pub u64);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One renameable image file.
///
/// The current name is always `base(@tag)*.ext` over the tag set in insertion
/// order, and is never a member of the history.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    id: PhotoId,
    dir: PathBuf,
    base: String,
    extension: String,
    name: String,
    tags: IndexSet<String>,
    history: IndexSet<String>,
}

impl Photo {
    /// Create an untagged photo from the file name it currently has on disk.
    pub fn new(id: PhotoId, name: &str, dir: &Path) -> Self {
        let (base, extension) = split_extension(name);
        Self {
            id,
            dir: dir.to_path_buf(),
            base: base.to_string(),
            extension: extension.to_string(),
            name: name.to_string(),
            tags: IndexSet::new(),
            history: IndexSet::new(),
        }
    }

    /// Rebuild a photo from stored parts. The caller is responsible for
    /// checking that the parts are consistent (see [`Photo::is_consistent`]).
    pub(crate) fn from_parts(
        id: PhotoId,
        dir: PathBuf,
        base: String,
        extension: String,
        name: String,
        tags: IndexSet<String>,
        history: IndexSet<String>,
    ) -> Self {
        Self {
            id,
            dir,
            base,
            extension,
            name,
            tags,
            history,
        }
    }

    pub fn id(&self) -> PhotoId {
        self.id
    }

    /// Current derived file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory the file lives in, relative to the library root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file relative to the library root.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    /// File name without extension and without any tags.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Applied tags in insertion order.
    pub fn tags(&self) -> &IndexSet<String> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Previously held names, oldest first.
    pub fn history(&self) -> &IndexSet<String> {
        &self.history
    }

    /// Append tags that are not already applied, then recompute the name.
    ///
    /// Returns the previous name if the photo was renamed.
    pub fn apply_tags<I, S>(&mut self, tags: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.tags.insert(tag.into());
        }
        self.refresh_name()
    }

    /// Remove a tag if applied. Returns the previous name if the photo was renamed.
    pub fn remove_tag(&mut self, tag: &str) -> Option<String> {
        if self.tags.shift_remove(tag) {
            self.refresh_name()
        } else {
            None
        }
    }

    /// Remove every tag.
    ///
    /// With `reset_name` false the name is left stale; the caller must apply
    /// the replacement tag set right away so the bare name never enters history.
    pub fn clear_tags(&mut self, reset_name: bool) -> Option<String> {
        self.tags.clear();
        if reset_name {
            self.refresh_name()
        } else {
            None
        }
    }

    /// The name this photo's current tag set renders to.
    pub fn derived_name(&self) -> String {
        render_name(&self.base, &self.tags, &self.extension)
    }

    /// Whether the stored name and history agree with the tag set.
    pub fn is_consistent(&self) -> bool {
        self.name == self.derived_name() && !self.history.contains(&self.name)
    }

    fn refresh_name(&mut self) -> Option<String> {
        let new_name = self.derived_name();
        if new_name == self.name {
            return None;
        }

        self.history.shift_remove(&new_name);
        let old_name = std::mem::replace(&mut self.name, new_name);
        self.history.insert(old_name.clone());
        debug!(photo = %self.id, from = %old_name, to = %self.name, "photo renamed");
        Some(old_name)
    }
}
