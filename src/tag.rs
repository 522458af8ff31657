use std::collections::BTreeSet;

use crate::photo::{Photo, PhotoId};

/// A label in the vocabulary, with the reverse index of photos carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    photos: BTreeSet<PhotoId>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            photos: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ids of the photos currently carrying this tag, in registration order.
    pub fn photos_with_tag(&self) -> &BTreeSet<PhotoId> {
        &self.photos
    }

    /// Re-sync the reverse index entry for `photo` from its tag set.
    ///
    /// Covers both "tag added" and "tag removed" since membership is read from
    /// the photo rather than passed in.
    pub fn on_photo_changed(&mut self, photo: &Photo) {
        if photo.has_tag(&self.name) {
            self.photos.insert(photo.id());
        } else {
            self.photos.remove(&photo.id());
        }
    }

    /// Drop a photo that left the registry.
    pub(crate) fn forget(&mut self, id: PhotoId) {
        self.photos.remove(&id);
    }
}
