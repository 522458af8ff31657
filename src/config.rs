//! Where a library's store lives and how logging is configured.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Database filename stored in the library root
pub const DB_FILENAME: &str = ".photo-renamer.db";

/// Overrides the database location when set
pub const DB_ENV: &str = "PHOTO_RENAMER_DB";

/// Log filter; also turns on stderr logging when set
pub const LOG_ENV: &str = "PHOTO_RENAMER_LOG";

/// Resolved paths for one photo library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    pub root: PathBuf,
    pub db_path: PathBuf,
}

impl LibraryConfig {
    /// Canonicalize the library root and pick the database path.
    pub fn resolve(library_path: &Path) -> Result<Self> {
        let root = library_path
            .canonicalize()
            .with_context(|| format!("Library path does not exist: {}", library_path.display()))?;

        let db_path = match std::env::var_os(DB_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => root.join(DB_FILENAME),
        };

        Ok(Self { root, db_path })
    }

    /// Fail unless `init` has been run for this library.
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.db_path.exists() {
            anyhow::bail!(
                "No database found at {}. Run 'photo-renamer init' first.",
                self.root.display()
            );
        }
        Ok(())
    }
}
