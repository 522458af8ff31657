use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, instrument, warn};

use crate::changelog::{ChangeEntry, ChangeLog};
use crate::error::{RenamerError, Result};
use crate::photo::{Photo, PhotoId};
use crate::snapshot::{PhotoRecord, Snapshot};
use crate::tag::Tag;

/// Registry key: a photo's directory plus its current file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PhotoKey {
    dir: PathBuf,
    name: String,
}

impl PhotoKey {
    fn new(dir: &Path, name: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            name: name.to_string(),
        }
    }
}

/// What the last broadcast announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    /// A tag was added to or removed from the vocabulary.
    VocabularyChanged(String),
    /// Some photo's tag set was replaced.
    PhotoSetChanged,
}

/// Result of replacing a photo's tag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSetChange {
    pub photo: PhotoId,
    pub dir: PathBuf,
    pub old_name: String,
    pub new_name: String,
}

impl TagSetChange {
    pub fn renamed(&self) -> bool {
        self.old_name != self.new_name
    }

    pub fn old_path(&self) -> PathBuf {
        self.dir.join(&self.old_name)
    }

    pub fn new_path(&self) -> PathBuf {
        self.dir.join(&self.new_name)
    }
}

/// Owner of the tag vocabulary and the photo registry.
///
/// All tag-set changes go through here so that the tag reverse indices and
/// the registry keys are updated in the same call as the photo itself.
/// Every mutation that observers care about bumps [`Manager::revision`]
/// once it is fully applied.
#[derive(Debug, Default)]
pub struct Manager {
    tags: IndexMap<String, Tag>,
    photos: IndexMap<PhotoId, Photo>,
    keys: HashMap<PhotoKey, PhotoId>,
    next_id: u64,
    revision: u64,
    last_event: Option<ManagerEvent>,
    change_log: ChangeLog,
}

impl Manager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incremented on every broadcast.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last_event(&self) -> Option<&ManagerEvent> {
        self.last_event.as_ref()
    }

    /// Vocabulary names in insertion order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Registered photos in registration order.
    pub fn photos(&self) -> impl Iterator<Item = &Photo> {
        self.photos.values()
    }

    pub fn photo(&self, id: PhotoId) -> Option<&Photo> {
        self.photos.get(&id)
    }

    /// Look a photo up by its current name without registering it.
    pub fn find_photo(&self, name: &str, dir: &Path) -> Option<&Photo> {
        self.keys
            .get(&PhotoKey::new(dir, name))
            .and_then(|id| self.photos.get(id))
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    /// Mark every logged change as written to the store.
    pub(crate) fn mark_changes_saved(&mut self) {
        self.change_log.mark_saved();
    }

    /// Resolve a photo by name and directory, registering it on first sight.
    pub fn get_or_create_photo(&mut self, name: &str, dir: &Path) -> PhotoId {
        self.photo_entry(name, dir).id()
    }

    fn photo_entry(&mut self, name: &str, dir: &Path) -> &mut Photo {
        let key = PhotoKey::new(dir, name);
        let id = match self.keys.get(&key) {
            Some(id) => *id,
            None => {
                let id = PhotoId(self.next_id);
                self.next_id += 1;
                self.keys.insert(key, id);
                debug!(photo = %id, name, dir = %dir.display(), "photo registered");
                id
            }
        };
        self.photos
            .entry(id)
            .or_insert_with(|| Photo::new(id, name, dir))
    }

    /// Add a tag to the vocabulary. Returns false if it already exists.
    pub fn add_tag(&mut self, name: &str) -> bool {
        if self.tags.contains_key(name) {
            return false;
        }
        self.tags.insert(name.to_string(), Tag::new(name));
        info!(tag = name, "tag added");
        self.broadcast(ManagerEvent::VocabularyChanged(name.to_string()));
        true
    }

    /// Delete a tag everywhere.
    ///
    /// Every photo carrying the tag loses it and is renamed. Returns each
    /// renamed photo keyed by its pre-delete path, in registration order.
    /// Deleting an unknown tag returns an empty map and broadcasts nothing.
    #[instrument(skip(self))]
    pub fn delete_tag(&mut self, name: &str) -> IndexMap<PathBuf, PhotoId> {
        let mut renamed = IndexMap::new();
        let Some(tag) = self.tags.get(name) else {
            return renamed;
        };
        let carriers: Vec<PhotoId> = tag.photos_with_tag().iter().copied().collect();

        for id in carriers {
            let Some(photo) = self.photos.get_mut(&id) else {
                continue;
            };
            let Some(old_name) = photo.remove_tag(name) else {
                continue;
            };
            let dir = photo.dir().to_path_buf();
            let new_name = photo.name().to_string();

            if let Some(tag) = self.tags.get_mut(name) {
                tag.on_photo_changed(&self.photos[&id]);
            }
            self.relocate(id, &dir, &old_name, &new_name);
            self.change_log
                .record(ChangeEntry::new(dir.clone(), old_name.clone(), new_name));
            renamed.insert(dir.join(old_name), id);
        }
        renamed.retain(|_, id| self.photos.contains_key(id));

        self.tags.shift_remove(name);
        info!(tag = name, renamed = renamed.len(), "tag deleted");
        self.broadcast(ManagerEvent::VocabularyChanged(name.to_string()));
        renamed
    }

    /// Replace a photo's whole tag set.
    ///
    /// Unknown tag names are added to the vocabulary. The photo is registered
    /// if needed, renamed to match the new set, relocated in the registry,
    /// and the change is logged.
    #[instrument(skip(self, tags), fields(tags = tags.len()))]
    pub fn set_photo_tag_set<S: AsRef<str>>(
        &mut self,
        name: &str,
        dir: &Path,
        tags: &[S],
    ) -> TagSetChange {
        let tag_names: IndexSet<String> = tags.iter().map(|t| t.as_ref().to_string()).collect();
        for tag_name in &tag_names {
            if !self.tags.contains_key(tag_name) {
                self.tags.insert(tag_name.clone(), Tag::new(tag_name.as_str()));
                debug!(tag = %tag_name, "tag created on first use");
            }
        }

        let photo = self.photo_entry(name, dir);
        let id = photo.id();
        let previous_tags: Vec<String> = photo.tags().iter().cloned().collect();
        let old_name = photo.name().to_string();
        photo.clear_tags(false);
        photo.apply_tags(tag_names);
        let new_name = photo.name().to_string();
        let photo_dir = photo.dir().to_path_buf();

        let photo = &self.photos[&id];
        for tag_name in previous_tags.iter().chain(photo.tags().iter()) {
            if let Some(tag) = self.tags.get_mut(tag_name) {
                tag.on_photo_changed(photo);
            }
        }

        self.relocate(id, &photo_dir, &old_name, &new_name);
        self.change_log.record(ChangeEntry::new(
            photo_dir.clone(),
            old_name.clone(),
            new_name.clone(),
        ));
        info!(photo = %id, from = %old_name, to = %new_name, "tag set replaced");
        self.broadcast(ManagerEvent::PhotoSetChanged);

        TagSetChange {
            photo: id,
            dir: photo_dir,
            old_name,
            new_name,
        }
    }

    /// Photos tied for the largest number of tags, in registration order.
    ///
    /// Empty when no photo carries any tag.
    pub fn most_tagged(&self) -> Vec<PhotoId> {
        self.most_tagged_in(self.photos.keys().copied())
    }

    /// Like [`Manager::most_tagged`], restricted to `candidates`.
    pub fn most_tagged_in<I>(&self, candidates: I) -> Vec<PhotoId>
    where
        I: IntoIterator<Item = PhotoId>,
    {
        let mut photos: Vec<&Photo> = candidates
            .into_iter()
            .filter_map(|id| self.photos.get(&id))
            .collect();
        photos.sort_by_key(|p| p.id());
        photos.dedup_by_key(|p| p.id());

        let max = photos.iter().map(|p| p.tags().len()).max().unwrap_or(0);
        if max == 0 {
            return Vec::new();
        }
        photos
            .into_iter()
            .filter(|p| p.tags().len() == max)
            .map(Photo::id)
            .collect()
    }

    /// Produce a snapshot that [`Manager::from_snapshot`] can reload.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            next_photo_id: self.next_id,
            tags: self.tags.keys().cloned().collect(),
            photos: self
                .photos
                .values()
                .map(|p| PhotoRecord {
                    id: p.id(),
                    dir: p.dir().to_path_buf(),
                    base: p.base().to_string(),
                    extension: p.extension().to_string(),
                    name: p.name().to_string(),
                    tags: p.tags().iter().cloned().collect(),
                    history: p.history().iter().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Adopt a previously saved vocabulary and registry.
    ///
    /// Tag reverse indices are rebuilt from the photos. Fails if a photo's
    /// name disagrees with its tags, a photo uses a tag missing from the
    /// vocabulary, or ids are duplicated or not below `next_photo_id`.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let mut manager = Self {
            next_id: snapshot.next_photo_id,
            ..Self::default()
        };

        for name in snapshot.tags {
            manager.tags.insert(name.clone(), Tag::new(name));
        }

        let mut records = snapshot.photos;
        records.sort_by_key(|r| r.id);

        for record in records {
            let id = record.id;
            if id.0 >= manager.next_id {
                return Err(RenamerError::CorruptSnapshot(format!(
                    "photo {id} is not below next id {}",
                    manager.next_id
                )));
            }
            if manager.photos.contains_key(&id) {
                return Err(RenamerError::CorruptSnapshot(format!("duplicate photo {id}")));
            }
            if let Some(missing) = record.tags.iter().find(|t| !manager.tags.contains_key(*t)) {
                return Err(RenamerError::CorruptSnapshot(format!(
                    "photo {id} uses unknown tag '{missing}'"
                )));
            }

            let photo = Photo::from_parts(
                id,
                record.dir,
                record.base,
                record.extension,
                record.name,
                record.tags.into_iter().collect(),
                record.history.into_iter().collect(),
            );
            if !photo.is_consistent() {
                return Err(RenamerError::CorruptSnapshot(format!(
                    "photo {id} name '{}' does not match its tags",
                    photo.name()
                )));
            }

            let key = PhotoKey::new(photo.dir(), photo.name());
            if let Some(previous) = manager.keys.insert(key, id) {
                warn!(photo = %id, shadowed = %previous, name = photo.name(), "duplicate registry key in snapshot");
            }
            for tag_name in photo.tags() {
                if let Some(tag) = manager.tags.get_mut(tag_name) {
                    tag.on_photo_changed(&photo);
                }
            }
            manager.photos.insert(id, photo);
        }

        debug!(
            tags = manager.tags.len(),
            photos = manager.photos.len(),
            "manager restored from snapshot"
        );
        Ok(manager)
    }

    /// Check the reverse-index, registry-key and naming invariants.
    pub fn verify(&self) -> Result<()> {
        for photo in self.photos.values() {
            if !photo.is_consistent() {
                return Err(RenamerError::CorruptSnapshot(format!(
                    "photo {} name '{}' does not match its tags",
                    photo.id(),
                    photo.name()
                )));
            }
            if self.keys.get(&PhotoKey::new(photo.dir(), photo.name())) != Some(&photo.id()) {
                return Err(RenamerError::CorruptSnapshot(format!(
                    "photo {} is not registered under '{}'",
                    photo.id(),
                    photo.name()
                )));
            }
            for tag_name in photo.tags() {
                let indexed = self
                    .tags
                    .get(tag_name)
                    .is_some_and(|t| t.photos_with_tag().contains(&photo.id()));
                if !indexed {
                    return Err(RenamerError::CorruptSnapshot(format!(
                        "tag '{tag_name}' does not index photo {}",
                        photo.id()
                    )));
                }
            }
        }

        for tag in self.tags.values() {
            for id in tag.photos_with_tag() {
                let carries = self.photos.get(id).is_some_and(|p| p.has_tag(tag.name()));
                if !carries {
                    return Err(RenamerError::CorruptSnapshot(format!(
                        "tag '{}' indexes photo {id} which does not carry it",
                        tag.name()
                    )));
                }
            }
        }
        Ok(())
    }

    fn relocate(&mut self, id: PhotoId, dir: &Path, old_name: &str, new_name: &str) {
        if old_name == new_name {
            return;
        }
        let old_key = PhotoKey::new(dir, old_name);
        if self.keys.get(&old_key) == Some(&id) {
            self.keys.remove(&old_key);
        }
        if let Some(previous) = self.keys.insert(PhotoKey::new(dir, new_name), id) {
            if previous != id {
                warn!(photo = %id, evicted = %previous, name = new_name, "rename collides with a registered photo, dropping it");
                self.evict(previous);
            }
        }
    }

    /// Remove a photo whose registry key was taken over by another photo.
    fn evict(&mut self, id: PhotoId) {
        let Some(photo) = self.photos.shift_remove(&id) else {
            return;
        };
        for tag_name in photo.tags() {
            if let Some(tag) = self.tags.get_mut(tag_name) {
                tag.forget(id);
            }
        }
    }

    fn broadcast(&mut self, event: ManagerEvent) {
        self.revision += 1;
        debug!(revision = self.revision, ?event, "manager changed");
        self.last_event = Some(event);
    }
}
