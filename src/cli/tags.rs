use std::path::Path;

use anyhow::Result;
use tracing::info;

use super::open_library;
use crate::session::CommitOutcome;

/// Options for the tags command
#[derive(Debug, Default)]
pub struct TagsOptions {
    pub add: Vec<String>,
    pub delete: Vec<String>,
}

/// Result of the tags command
#[derive(Debug, Default)]
pub struct TagsReport {
    /// Vocabulary after the changes, in insertion order
    pub tags: Vec<String>,
    /// One entry per image renamed by a deletion
    pub renames: Vec<CommitOutcome>,
}

/// Edit or show the tag vocabulary.
///
/// Deleting a tag removes it from every image carrying it and renames
/// those files.
pub fn run_tags(library_path: &Path, options: TagsOptions) -> Result<TagsReport> {
    let mut session = open_library(library_path)?;
    let mut report = TagsReport::default();

    for tag in &options.add {
        if !session.add_tag(tag)? {
            info!(tag = %tag, "tag already exists");
        }
    }
    for tag in &options.delete {
        report.renames.extend(session.delete_tag(tag));
    }

    if !options.add.is_empty() || !options.delete.is_empty() {
        session.save()?;
    }

    report.tags = session.manager().tag_names().map(str::to_string).collect();
    Ok(report)
}
