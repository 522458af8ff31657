use std::path::Path;

use anyhow::{Context, Result};

use crate::changelog::ChangeEntry;
use crate::config::LibraryConfig;
use crate::db::Database;

/// Read the library's rename log, oldest first. `limit` keeps the newest entries.
pub fn run_log(library_path: &Path, limit: Option<usize>) -> Result<Vec<ChangeEntry>> {
    let config = LibraryConfig::resolve(library_path)?;
    config.ensure_initialized()?;

    let db = Database::open(&config.db_path)
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;
    db.get_change_log(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::library_with;
    use crate::cli::{run_tag, run_tags, TagOptions, TagsOptions};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_log_records_tagging_and_deletion() {
        let (_temp_dir, lib_path) = library_with(&["trip/img.jpg"]);
        assert!(run_log(&lib_path, None).unwrap().is_empty());

        run_tag(
            &lib_path,
            Path::new("trip/img.jpg"),
            TagOptions {
                add: vec!["Apple".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        run_tags(
            &lib_path,
            TagsOptions {
                delete: vec!["Apple".to_string()],
                ..Default::default()
            },
        )
        .unwrap();

        let log = run_log(&lib_path, None).unwrap();
        let renames: Vec<_> = log
            .iter()
            .map(|e| (e.old_name.as_str(), e.new_name.as_str()))
            .collect();
        assert_eq!(
            renames,
            vec![("img.jpg", "img@Apple.jpg"), ("img@Apple.jpg", "img.jpg")]
        );
        assert_eq!(log[0].dir, PathBuf::from("trip"));

        let newest = run_log(&lib_path, Some(1)).unwrap();
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0].new_name, "img.jpg");
    }

    #[test]
    fn test_log_no_database() {
        let temp_dir = TempDir::new().unwrap();
        assert!(run_log(temp_dir.path(), None).is_err());
    }
}
