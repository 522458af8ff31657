use std::path::Path;

use anyhow::{Context, Result};

use super::open_working;
use crate::action::ActionMode;
use crate::session::CommitOutcome;

/// Names an image has held before, oldest first
pub fn run_history(library_path: &Path, file_path: &Path) -> Result<Vec<String>> {
    let mut session = open_working(library_path, file_path)?;
    session.switch_mode(ActionMode::Reverting);
    Ok(session.view().options)
}

/// Rename an image back to one of its previous names.
///
/// `target` is either a previous name or its index in [`run_history`].
pub fn run_revert(library_path: &Path, file_path: &Path, target: &str) -> Result<CommitOutcome> {
    let mut session = open_working(library_path, file_path)?;
    session.switch_mode(ActionMode::Reverting);

    let view = session.view();
    let index = view
        .index_of(target)
        .or_else(|| target.parse::<usize>().ok())
        .with_context(|| format!("{} has never been named {target}", file_path.display()))?;

    session.toggle_option(index)?;
    let outcome = session
        .commit()
        .with_context(|| format!("Nothing to revert for {}", file_path.display()))?;
    session.close()?;
    Ok(outcome)
}
