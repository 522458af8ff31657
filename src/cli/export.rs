use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use super::open_library;
use crate::manager::Manager;
use crate::snapshot::Snapshot;

/// Counts of what was exported or imported
#[derive(Debug, Default, PartialEq)]
pub struct ExportStats {
    pub tags: usize,
    pub photos: usize,
}

impl ExportStats {
    fn of(snapshot: &Snapshot) -> Self {
        Self {
            tags: snapshot.tags.len(),
            photos: snapshot.photos.len(),
        }
    }
}

/// Write the vocabulary and every photo's tags and history to a JSON file
#[instrument(skip_all, fields(output = %output.display()))]
pub fn run_export(library_path: &Path, output: &Path) -> Result<ExportStats> {
    let session = open_library(library_path)?;
    let snapshot = session.manager().snapshot();

    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(output, json)
        .with_context(|| format!("Failed to write export to {}", output.display()))?;

    let stats = ExportStats::of(&snapshot);
    info!(tags = stats.tags, photos = stats.photos, "exported");
    Ok(stats)
}

/// Replace the library's state with a previous export.
///
/// Files on disk are not renamed; the export is expected to describe them
/// as they are.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn run_import(library_path: &Path, input: &Path) -> Result<ExportStats> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&json)
        .with_context(|| format!("Invalid export file: {}", input.display()))?;
    let stats = ExportStats::of(&snapshot);

    let manager = Manager::from_snapshot(snapshot)
        .with_context(|| format!("Rejected export file: {}", input.display()))?;

    let mut session = open_library(library_path)?;
    session.replace_manager(manager);
    session.close()?;

    info!(tags = stats.tags, photos = stats.photos, "imported");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::library_with;
    use crate::cli::{run_list, run_tag, run_tags, ListOptions, TagOptions, TagsOptions};
    use tempfile::TempDir;

    #[test]
    fn test_export_then_import_restores_tags() {
        let (_temp_dir, lib_path) = library_with(&["a.jpg", "b.jpg"]);
        run_tag(
            &lib_path,
            Path::new("a.jpg"),
            TagOptions {
                add: vec!["Apple".to_string()],
                ..Default::default()
            },
        )
        .unwrap();

        let out = TempDir::new().unwrap();
        let export_path = out.path().join("library.json");
        let stats = run_export(&lib_path, &export_path).unwrap();
        assert_eq!(stats, ExportStats { tags: 1, photos: 2 });

        // Forget everything, then restore it.
        run_tags(
            &lib_path,
            TagsOptions {
                add: vec!["Extra".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        let stats = run_import(&lib_path, &export_path).unwrap();
        assert_eq!(stats.photos, 2);

        let report = run_tags(&lib_path, TagsOptions::default()).unwrap();
        assert_eq!(report.tags, vec!["Apple"]);

        let listed = run_list(&lib_path, ListOptions::default()).unwrap();
        let apple = listed.iter().find(|p| p.path == "a@Apple.jpg").unwrap();
        assert_eq!(apple.tags, vec!["Apple"]);
    }

    #[test]
    fn test_import_rejects_inconsistent_export() {
        let (_temp_dir, lib_path) = library_with(&["a.jpg"]);
        let out = TempDir::new().unwrap();
        let path = out.path().join("bad.json");
        fs::write(
            &path,
            r#"{"next_photo_id":1,"tags":[],"photos":[{"id":0,"dir":"","base":"a","extension":"jpg","name":"a@Ghost.jpg","tags":["Ghost"],"history":[]}]}"#,
        )
        .unwrap();

        let err = run_import(&lib_path, &path).unwrap_err();
        assert!(err.to_string().contains("Rejected export file"));
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let (_temp_dir, lib_path) = library_with(&["a.jpg"]);
        let out = TempDir::new().unwrap();
        let path = out.path().join("bad.json");
        fs::write(&path, "not json").unwrap();

        assert!(run_import(&lib_path, &path).is_err());
    }
}
