use std::path::Path;

use anyhow::Result;
use tracing::debug;

use super::open_working;
use crate::action::ActionMode;
use crate::session::CommitOutcome;

/// Options for the tag command
#[derive(Debug, Default)]
pub struct TagOptions {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

/// Result of the tag command
#[derive(Debug)]
pub struct TagReport {
    /// `None` when nothing was asked to change
    pub outcome: Option<CommitOutcome>,
    pub tags: Vec<String>,
}

/// Add or remove tags on one image, renaming it to match.
///
/// Unknown tags given to `add` join the vocabulary first. With no
/// changes requested the current tags are reported.
///
/// # Arguments
/// * `library_path` - Path to the library root
/// * `file_path` - Path to the image (relative to library root)
/// * `options` - What tags to add/remove
pub fn run_tag(library_path: &Path, file_path: &Path, options: TagOptions) -> Result<TagReport> {
    let mut session = open_working(library_path, file_path)?;
    session.switch_mode(ActionMode::Tagging);

    let mut outcome = None;
    if !options.add.is_empty() || !options.remove.is_empty() {
        for tag in &options.add {
            session.add_tag(tag)?;
        }

        let view = session.view();
        let toggles: Vec<usize> = view
            .options
            .iter()
            .enumerate()
            .filter(|(i, option)| {
                let selected = view.is_selected(*i);
                let wanted = !options.remove.contains(option)
                    && (selected || options.add.contains(option));
                selected != wanted
            })
            .map(|(i, _)| i)
            .collect();

        for index in toggles {
            session.toggle_option(index)?;
        }
        debug!(file = %file_path.display(), "committing tag changes");
        outcome = session.commit();
        session.save()?;
    }

    let tags = session
        .working_photo()
        .map(|photo| photo.tags().iter().cloned().collect())
        .unwrap_or_default();
    Ok(TagReport { outcome, tags })
}
