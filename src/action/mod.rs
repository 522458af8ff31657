//! Per-mode projections of the manager onto a selectable option list.
//!
//! An action tracks one working photo. Its options are re-derived from the
//! manager whenever the manager's revision moves past the one the action last
//! saw, which also resets the selection.

mod reverting;
mod tagging;

use std::fmt;
use std::str::FromStr;

pub use reverting::RevertingAction;
pub use tagging::TaggingAction;

use crate::error::{RenamerError, Result};
use crate::manager::{Manager, TagSetChange};
use crate::photo::PhotoId;

/// The two mutually exclusive ways of changing a photo's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionMode {
    /// Multi-select over the vocabulary; commits a new tag set.
    #[default]
    Tagging,
    /// Single-select over the photo's history; commits the tags a past name encodes.
    Reverting,
}

impl ActionMode {
    pub fn label(&self) -> &'static str {
        match self {
            ActionMode::Tagging => "Tagging",
            ActionMode::Reverting => "Reverting",
        }
    }
}

impl fmt::Display for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Tagging" => Ok(ActionMode::Tagging),
            "Reverting" => Ok(ActionMode::Reverting),
            other => Err(format!("unknown action mode '{other}'")),
        }
    }
}

/// Options as currently derived, with the indices the user has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionView {
    pub options: Vec<String>,
    /// Ascending indices into `options`.
    pub selected: Vec<usize>,
}

impl ActionView {
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Selected option strings in option order.
    pub fn selected_options(&self) -> Vec<&str> {
        self.selected
            .iter()
            .filter_map(|i| self.options.get(*i))
            .map(String::as_str)
            .collect()
    }

    pub fn index_of(&self, option: &str) -> Option<usize> {
        self.options.iter().position(|o| o == option)
    }
}

/// Common contract of [`TaggingAction`] and [`RevertingAction`].
pub trait Action {
    fn mode(&self) -> ActionMode;

    fn working_photo(&self) -> Option<PhotoId>;

    /// Switch to `photo` (or to no photo), re-deriving options and selection.
    fn reset(&mut self, manager: &Manager, photo: Option<PhotoId>);

    /// Whether the manager has broadcast since options were last derived.
    fn is_stale(&self, manager: &Manager) -> bool;

    /// Re-derive against the current working photo if the manager changed.
    fn on_manager_changed(&mut self, manager: &Manager) {
        if self.is_stale(manager) {
            let photo = self.working_photo();
            self.reset(manager, photo);
        }
    }

    fn view(&mut self, manager: &Manager) -> ActionView;

    /// Flip the selection state of one option.
    fn toggle_option(&mut self, manager: &Manager, index: usize) -> Result<()>;

    /// Apply the selection through the manager. Returns `None` when there is
    /// nothing to commit.
    fn commit(&mut self, manager: &mut Manager) -> Option<TagSetChange>;
}

/// Working photo and the options derived for it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Projection {
    photo: Option<PhotoId>,
    options: Vec<String>,
    revision: Option<u64>,
}

impl Projection {
    fn reset(&mut self, manager: &Manager, photo: Option<PhotoId>, options: Vec<String>) {
        self.photo = photo;
        self.options = options;
        self.revision = Some(manager.revision());
    }

    fn is_stale(&self, manager: &Manager) -> bool {
        self.revision != Some(manager.revision())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.options.len() {
            Ok(())
        } else {
            Err(RenamerError::OptionOutOfRange {
                index,
                len: self.options.len(),
            })
        }
    }
}
