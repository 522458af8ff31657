use tracing::debug;

use super::{Action, ActionMode, ActionView, Projection};
use crate::error::Result;
use crate::manager::{Manager, TagSetChange};
use crate::naming::parse_tags;
use crate::photo::PhotoId;

/// Pick one of the working photo's previous names to go back to.
///
/// Options are the history, oldest first. Nothing starts selected, and at
/// most one option is selected at a time.
#[derive(Debug, Default)]
pub struct RevertingAction {
    projection: Projection,
    selected: Option<usize>,
}

impl RevertingAction {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Action for RevertingAction {
    fn mode(&self) -> ActionMode {
        ActionMode::Reverting
    }

    fn working_photo(&self) -> Option<PhotoId> {
        self.projection.photo
    }

    fn reset(&mut self, manager: &Manager, photo: Option<PhotoId>) {
        self.selected = None;
        match photo.and_then(|id| manager.photo(id)) {
            Some(photo) => {
                let options = photo.history().iter().cloned().collect();
                self.projection.reset(manager, Some(photo.id()), options);
            }
            None => self.projection.reset(manager, None, Vec::new()),
        }
    }

    fn is_stale(&self, manager: &Manager) -> bool {
        self.projection.is_stale(manager)
    }

    fn view(&mut self, manager: &Manager) -> ActionView {
        self.on_manager_changed(manager);
        ActionView {
            options: self.projection.options.clone(),
            selected: self.selected.into_iter().collect(),
        }
    }

    fn toggle_option(&mut self, manager: &Manager, index: usize) -> Result<()> {
        self.on_manager_changed(manager);
        self.projection.check_index(index)?;
        self.selected = if self.selected == Some(index) {
            None
        } else {
            Some(index)
        };
        Ok(())
    }

    fn commit(&mut self, manager: &mut Manager) -> Option<TagSetChange> {
        self.on_manager_changed(manager);
        let id = self.projection.photo?;
        let target = self.projection.options.get(self.selected?)?;
        let photo = manager.photo(id)?;

        let tags = parse_tags(target, photo.base());
        let (name, dir) = (photo.name().to_string(), photo.dir().to_path_buf());
        debug!(photo = %id, target = %target, ?tags, "reverting to previous name");

        let change = manager.set_photo_tag_set(&name, &dir, &tags);
        self.on_manager_changed(manager);
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenamerError;
    use std::path::Path;

    fn root() -> &'static Path {
        Path::new("")
    }

    fn tag(manager: &mut Manager, id: PhotoId, tags: &[&str]) {
        let name = manager.photo(id).unwrap().name().to_string();
        manager.set_photo_tag_set(&name, root(), tags);
    }

    #[test]
    fn test_reset_lists_history_with_nothing_selected() {
        let mut manager = Manager::new();
        let id = manager.get_or_create_photo("test1.jpg", root());
        let mut action = RevertingAction::new();

        action.reset(&manager, None);
        assert_eq!(action.view(&manager), ActionView::default());

        tag(&mut manager, id, &["Apple", "Banana", "Orange"]);
        action.reset(&manager, Some(id));
        let view = action.view(&manager);
        assert_eq!(view.options, vec!["test1.jpg"]);
        assert!(view.selected.is_empty());
    }

    #[test]
    fn test_options_follow_renames() {
        let mut manager = Manager::new();
        let id = manager.get_or_create_photo("test2.jpg", root());
        let mut action = RevertingAction::new();
        action.reset(&manager, Some(id));
        assert!(action.view(&manager).options.is_empty());

        tag(&mut manager, id, &["Apple", "Banana", "Orange"]);
        tag(&mut manager, id, &["Pineapple", "Kumquat"]);
        assert_eq!(
            action.view(&manager).options,
            vec!["test2.jpg", "test2@Apple@Banana@Orange.jpg"]
        );
    }

    #[test]
    fn test_toggle_is_exclusive() {
        let mut manager = Manager::new();
        let id = manager.get_or_create_photo("test4.jpg", root());
        tag(&mut manager, id, &["Apple"]);
        tag(&mut manager, id, &["Banana"]);
        let mut action = RevertingAction::new();
        action.reset(&manager, Some(id));

        action.toggle_option(&manager, 0).unwrap();
        assert_eq!(action.view(&manager).selected_options(), vec!["test4.jpg"]);

        action.toggle_option(&manager, 1).unwrap();
        assert_eq!(action.view(&manager).selected, vec![1]);

        action.toggle_option(&manager, 1).unwrap();
        assert!(action.view(&manager).selected.is_empty());

        assert!(matches!(
            action.toggle_option(&manager, 5),
            Err(RenamerError::OptionOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_broadcast_clears_selection_and_refreshes_history() {
        let mut manager = Manager::new();
        let id = manager.get_or_create_photo("test5.jpg", root());
        let mut action = RevertingAction::new();
        action.reset(&manager, Some(id));

        tag(&mut manager, id, &["Apple", "Banana", "Watermelon"]);
        tag(&mut manager, id, &["Orange", "Cherry"]);
        action.toggle_option(&manager, 0).unwrap();

        manager.add_tag("Apricot");
        assert!(action.view(&manager).selected.is_empty());

        manager.delete_tag("Orange");
        manager.delete_tag("Cherry");
        // Back at the bare name, which therefore leaves the history.
        assert_eq!(
            action.view(&manager).options,
            vec![
                "test5@Apple@Banana@Watermelon.jpg",
                "test5@Orange@Cherry.jpg",
                "test5@Cherry.jpg",
            ]
        );
    }

    #[test]
    fn test_commit_requires_selection() {
        let mut manager = Manager::new();
        let id = manager.get_or_create_photo("test7.jpg", root());
        tag(&mut manager, id, &["Grape"]);
        let mut action = RevertingAction::new();
        action.reset(&manager, Some(id));

        assert!(action.commit(&mut manager).is_none());
        assert_eq!(manager.photo(id).unwrap().name(), "test7@Grape.jpg");
    }

    #[test]
    fn test_scenario_c_revert_to_bare_name() {
        let mut manager = Manager::new();
        let id = manager.get_or_create_photo("img.jpg", root());
        tag(&mut manager, id, &["Apple"]);
        tag(&mut manager, id, &["Apple", "Banana"]);
        let photo = manager.photo(id).unwrap();
        assert_eq!(photo.name(), "img@Apple@Banana.jpg");
        assert_eq!(
            photo.history().iter().collect::<Vec<_>>(),
            vec!["img.jpg", "img@Apple.jpg"]
        );

        let mut action = RevertingAction::new();
        action.reset(&manager, Some(id));
        action.toggle_option(&manager, 0).unwrap();
        let change = action.commit(&mut manager).unwrap();

        assert_eq!(change.new_name, "img.jpg");
        let photo = manager.photo(id).unwrap();
        assert!(photo.tags().is_empty());
        assert_eq!(
            photo.history().last().map(String::as_str),
            Some("img@Apple@Banana.jpg")
        );
        assert!(action.view(&manager).selected.is_empty());
        manager.verify().unwrap();
    }

    #[test]
    fn test_revert_revives_deleted_tag() {
        let mut manager = Manager::new();
        let id = manager.get_or_create_photo("testImage1.jpg", root());
        tag(&mut manager, id, &["Beige", "Olive"]);
        manager.delete_tag("Olive");

        let mut action = RevertingAction::new();
        action.reset(&manager, Some(id));
        let index = action.view(&manager).index_of("testImage1@Beige@Olive.jpg").unwrap();
        action.toggle_option(&manager, index).unwrap();
        action.commit(&mut manager).unwrap();

        assert_eq!(manager.photo(id).unwrap().name(), "testImage1@Beige@Olive.jpg");
        assert!(manager.has_tag("Olive"));
        manager.verify().unwrap();
    }
}
