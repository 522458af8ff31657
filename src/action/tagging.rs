use std::collections::BTreeSet;

use tracing::debug;

use super::{Action, ActionMode, ActionView, Projection};
use crate::error::Result;
use crate::manager::{Manager, TagSetChange};
use crate::photo::PhotoId;

/// Choose any subset of the vocabulary as the working photo's tag set.
///
/// Options are the vocabulary in insertion order. After a reset the photo's
/// current tags start out selected.
#[derive(Debug, Default)]
pub struct TaggingAction {
    projection: Projection,
    selected: BTreeSet<usize>,
}

impl TaggingAction {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Action for TaggingAction {
    fn mode(&self) -> ActionMode {
        ActionMode::Tagging
    }

    fn working_photo(&self) -> Option<PhotoId> {
        self.projection.photo
    }

    fn reset(&mut self, manager: &Manager, photo: Option<PhotoId>) {
        self.selected.clear();
        let Some(photo) = photo.and_then(|id| manager.photo(id)) else {
            self.projection.reset(manager, None, Vec::new());
            return;
        };

        let options: Vec<String> = manager.tag_names().map(str::to_string).collect();
        self.selected = options
            .iter()
            .enumerate()
            .filter(|(_, tag)| photo.has_tag(tag))
            .map(|(i, _)| i)
            .collect();
        self.projection.reset(manager, Some(photo.id()), options);
    }

    fn is_stale(&self, manager: &Manager) -> bool {
        self.projection.is_stale(manager)
    }

    fn view(&mut self, manager: &Manager) -> ActionView {
        self.on_manager_changed(manager);
        ActionView {
            options: self.projection.options.clone(),
            selected: self.selected.iter().copied().collect(),
        }
    }

    fn toggle_option(&mut self, manager: &Manager, index: usize) -> Result<()> {
        self.on_manager_changed(manager);
        self.projection.check_index(index)?;
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
        Ok(())
    }

    fn commit(&mut self, manager: &mut Manager) -> Option<TagSetChange> {
        self.on_manager_changed(manager);
        let id = self.projection.photo?;
        let photo = manager.photo(id)?;
        let (name, dir) = (photo.name().to_string(), photo.dir().to_path_buf());

        // Vocabulary order, not the order the user clicked in.
        let tags: Vec<&str> = self
            .selected
            .iter()
            .filter_map(|i| self.projection.options.get(*i))
            .map(String::as_str)
            .collect();
        debug!(photo = %id, ?tags, "committing tag selection");

        let change = manager.set_photo_tag_set(&name, &dir, &tags);
        self.on_manager_changed(manager);
        Some(change)
    }
}
