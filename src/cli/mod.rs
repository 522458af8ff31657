mod export;
mod init;
mod list;
mod log;
mod revert;
mod tag;
mod tags;

use std::path::Path;

use anyhow::Result;

use crate::config::LibraryConfig;
use crate::session::Session;

pub use export::{run_export, run_import, ExportStats};
pub use init::{run_init, InitStats};
pub use list::{run_list, run_most_tagged, ListOptions, PhotoInfo};
pub use log::run_log;
pub use revert::{run_history, run_revert};
pub use tag::{run_tag, TagOptions, TagReport};
pub use tags::{run_tags, TagsOptions, TagsReport};

/// Open an initialized library and view every image in it.
fn open_library(library_path: &Path) -> Result<Session> {
    let config = LibraryConfig::resolve(library_path)?;
    config.ensure_initialized()?;

    let mut session = Session::open(&config)?;
    let images = session.scan(&config.root);
    session.set_viewing_images(images);
    Ok(session)
}

/// Open a library and make `file` (relative to the library root) the working photo.
fn open_working(library_path: &Path, file: &Path) -> Result<Session> {
    let mut session = open_library(library_path)?;
    if let Err(e) = session.set_working_file(Some(file)) {
        anyhow::bail!("Image not found in library: {} ({e})", file.display());
    }
    Ok(session)
}
