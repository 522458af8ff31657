use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use tracing::{info, instrument};

use crate::config::LibraryConfig;
use crate::session::Session;

/// Statistics from the init operation
#[derive(Debug, Default)]
pub struct InitStats {
    pub directories: usize,
    pub images: usize,
    /// Images seen for the first time
    pub registered: usize,
}

/// Run the init command: create the store and register every image under the root.
///
/// Running it again picks up images added since; known photos are left alone.
#[instrument(skip_all, fields(library = %library_path.display()))]
pub fn run_init(library_path: &Path) -> Result<InitStats> {
    let config = LibraryConfig::resolve(library_path)?;
    let mut session = Session::open(&config)?;

    let images = session.scan(&config.root);
    let before = session.manager().photos().count();

    let mut directories = HashSet::new();
    for image in &images {
        session.register(image);
        if let Some(parent) = image.parent().filter(|p| !p.as_os_str().is_empty()) {
            directories.insert(parent.to_path_buf());
        }
    }

    let stats = InitStats {
        directories: directories.len(),
        images: images.len(),
        registered: session.manager().photos().count() - before,
    };
    info!(
        images = stats.images,
        registered = stats.registered,
        "library scanned"
    );

    session.close()?;
    Ok(stats)
}
