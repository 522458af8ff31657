//! The coordinator between the user, the manager and the file system.
//!
//! A [`Session`] holds the images being browsed, the working photo and the
//! active action. Logical changes go through the [`Manager`]; the physical
//! rename follows and is never rolled back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::action::{Action, ActionMode, ActionView, RevertingAction, TaggingAction};
use crate::config::LibraryConfig;
use crate::db::Database;
use crate::error::RenamerError;
use crate::manager::Manager;
use crate::naming::is_valid_tag_name;
use crate::photo::{Photo, PhotoId};
use crate::renamer::{FileRenamer, FsRenamer};
use crate::scanner::{is_image, Scanner};

/// What happened on disk after a logical rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The derived name did not change.
    Unchanged { path: PathBuf },
    Renamed { from: PathBuf, to: PathBuf },
    /// The logical rename stands but the file keeps its old name.
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
}

impl CommitOutcome {
    /// The photo's logical path after the change, relative to the library root.
    pub fn path(&self) -> &Path {
        match self {
            CommitOutcome::Unchanged { path } => path,
            CommitOutcome::Renamed { to, .. } | CommitOutcome::RenameFailed { to, .. } => to,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CommitOutcome::RenameFailed { .. })
    }
}

/// Borrow the action for `mode` without borrowing the rest of the session.
fn active_action<'a>(
    mode: ActionMode,
    tagging: &'a mut TaggingAction,
    reverting: &'a mut RevertingAction,
) -> &'a mut dyn Action {
    match mode {
        ActionMode::Tagging => tagging,
        ActionMode::Reverting => reverting,
    }
}

pub struct Session<R: FileRenamer = FsRenamer> {
    root: PathBuf,
    manager: Manager,
    renamer: R,
    /// Paths relative to `root`, in the order they were given.
    viewing: Vec<PathBuf>,
    working: Option<PhotoId>,
    mode: ActionMode,
    tagging: TaggingAction,
    reverting: RevertingAction,
    store: Option<Database>,
}

impl Session<FsRenamer> {
    /// Open a library, restoring the manager from its store.
    ///
    /// A store that cannot be read back yields an empty manager. A store
    /// file that is not a database is moved aside to `<db>.corrupt` and
    /// replaced with a fresh one.
    #[instrument(skip_all, fields(root = %config.root.display()))]
    pub fn open(config: &LibraryConfig) -> Result<Self> {
        let store = open_store(&config.db_path)?;
        let manager = load_manager(&store);

        let mut session = Session::new(config.root.clone(), manager, FsRenamer);
        session.store = Some(store);
        Ok(session)
    }
}

fn open_store(db_path: &Path) -> Result<Database> {
    match Database::open(db_path) {
        Ok(store) => Ok(store),
        Err(e) if db_path.exists() => {
            let aside = corrupt_path(db_path);
            warn!(
                error = %e,
                moved_to = %aside.display(),
                "store is unreadable, starting with a fresh one"
            );
            fs::rename(db_path, &aside).with_context(|| {
                format!("Failed to move unreadable database to {}", aside.display())
            })?;
            Database::open(db_path)
                .with_context(|| format!("Failed to open database at {}", db_path.display()))
        }
        Err(e) => Err(e.context(format!(
            "Failed to open database at {}",
            db_path.display()
        ))),
    }
}

/// Where an unreadable store is moved: `<db>.corrupt`.
fn corrupt_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

fn load_manager(store: &Database) -> Manager {
    match store.load_snapshot() {
        Ok(Some(snapshot)) => match Manager::from_snapshot(snapshot) {
            Ok(manager) => manager,
            Err(e) => {
                warn!(error = %e, "stored snapshot rejected, starting empty");
                Manager::new()
            }
        },
        Ok(None) => {
            debug!("no stored snapshot, starting empty");
            Manager::new()
        }
        Err(e) => {
            warn!(error = %e, "failed to read stored snapshot, starting empty");
            Manager::new()
        }
    }
}

impl<R: FileRenamer> Session<R> {
    /// A session without a store; [`Session::save`] does nothing.
    pub fn new(root: PathBuf, manager: Manager, renamer: R) -> Self {
        let mut session = Self {
            root,
            manager,
            renamer,
            viewing: Vec::new(),
            working: None,
            mode: ActionMode::default(),
            tagging: TaggingAction::new(),
            reverting: RevertingAction::new(),
            store: None,
        };
        session.reset_actions();
        session
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    pub fn renamer(&self) -> &R {
        &self.renamer
    }

    pub fn store(&self) -> Option<&Database> {
        self.store.as_ref()
    }

    /// Flush the manager and any new change-log entries to the store.
    pub fn save(&mut self) -> Result<()> {
        let Some(store) = &self.store else {
            debug!("no store attached, nothing to save");
            return Ok(());
        };
        store
            .save_snapshot(&self.manager.snapshot())
            .context("Failed to save snapshot")?;
        store
            .append_changes(self.manager.change_log().unsaved())
            .context("Failed to save change log")?;
        self.manager.mark_changes_saved();
        info!("session saved");
        Ok(())
    }

    /// Save and end the session.
    pub fn close(mut self) -> Result<()> {
        self.save()
    }

    /// Swap in a different manager, e.g. one restored from an export.
    /// The working photo is cleared.
    pub fn replace_manager(&mut self, manager: Manager) {
        self.manager = manager;
        self.working = None;
        self.reset_actions();
    }

    /// All images below `dir` (relative to the root, or absolute), relative to the root.
    pub fn scan(&self, dir: &Path) -> Vec<PathBuf> {
        let start = self.root.join(self.relative(dir));
        let mut images: Vec<PathBuf> = Scanner::new(start)
            .scan_images()
            .into_iter()
            .map(|image| self.relative(&image.path))
            .collect();
        images.sort();
        images
    }

    /// Replace the browsed images. Non-images are dropped; the working photo
    /// is cleared if it is no longer among them.
    pub fn set_viewing_images<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.viewing.clear();
        for path in paths {
            let path = path.as_ref();
            if !is_image(path) {
                debug!(path = %path.display(), "skipping non-image");
                continue;
            }
            let relative = self.relative(path);
            if !self.viewing.contains(&relative) {
                self.viewing.push(relative);
            }
        }

        if let Some(working) = self.working_file() {
            if !self.viewing.contains(&working) {
                self.working = None;
                self.reset_actions();
            }
        }
    }

    pub fn viewing_images(&self) -> &[PathBuf] {
        &self.viewing
    }

    /// Current path of the working photo, relative to the root.
    pub fn working_file(&self) -> Option<PathBuf> {
        self.working
            .and_then(|id| self.manager.photo(id))
            .map(Photo::path)
    }

    pub fn working_photo(&self) -> Option<&Photo> {
        self.working.and_then(|id| self.manager.photo(id))
    }

    /// Make `path` the working photo, or clear it with `None`.
    ///
    /// The path must be one of the viewed images. Both actions are reset.
    pub fn set_working_file(&mut self, path: Option<&Path>) -> crate::error::Result<()> {
        self.working = match path {
            None => None,
            Some(path) => {
                let relative = self.relative(path);
                if !self.viewing.contains(&relative) {
                    return Err(RenamerError::NotViewing(path.to_path_buf()));
                }
                Some(self.register(&relative))
            }
        };
        self.reset_actions();
        Ok(())
    }

    /// Resolve a root-relative image path to its photo, registering it if new.
    pub fn register(&mut self, relative: &Path) -> PhotoId {
        let (name, dir) = split_path(relative);
        self.manager.get_or_create_photo(&name, &dir)
    }

    /// The registered photo at `path`, if any.
    pub fn photo_at(&self, path: &Path) -> Option<&Photo> {
        let (name, dir) = split_path(&self.relative(path));
        self.manager.find_photo(&name, &dir)
    }

    pub fn mode(&self) -> ActionMode {
        self.mode
    }

    /// Make `mode` the active action, starting it fresh on the working photo.
    pub fn switch_mode(&mut self, mode: ActionMode) {
        self.mode = mode;
        let working = self.working;
        active_action(self.mode, &mut self.tagging, &mut self.reverting).reset(&self.manager, working);
        debug!(mode = %mode, "action mode switched");
    }

    /// Switch by label. Unknown labels leave the mode unchanged.
    pub fn switch_mode_label(&mut self, label: &str) -> bool {
        match label.parse::<ActionMode>() {
            Ok(mode) => {
                self.switch_mode(mode);
                true
            }
            Err(e) => {
                debug!(error = %e, "ignoring mode switch");
                false
            }
        }
    }

    /// Options and selection of the active action.
    pub fn view(&mut self) -> ActionView {
        active_action(self.mode, &mut self.tagging, &mut self.reverting).view(&self.manager)
    }

    pub fn toggle_option(&mut self, index: usize) -> crate::error::Result<()> {
        active_action(self.mode, &mut self.tagging, &mut self.reverting)
            .toggle_option(&self.manager, index)
    }

    /// Commit the active action and rename the file to match.
    ///
    /// Returns `None` when the action had nothing to commit.
    pub fn commit(&mut self) -> Option<CommitOutcome> {
        let change =
            active_action(self.mode, &mut self.tagging, &mut self.reverting).commit(&mut self.manager)?;
        Some(self.rename_file(change.old_path(), change.new_path()))
    }

    /// Add a user-entered tag to the vocabulary.
    pub fn add_tag(&mut self, name: &str) -> crate::error::Result<bool> {
        if !is_valid_tag_name(name) {
            return Err(RenamerError::InvalidTagName(name.to_string()));
        }
        Ok(self.manager.add_tag(name))
    }

    /// Delete a tag everywhere and rename every affected file.
    pub fn delete_tag(&mut self, name: &str) -> Vec<CommitOutcome> {
        let renamed = self.manager.delete_tag(name);
        let mut outcomes = Vec::with_capacity(renamed.len());
        for (old_path, id) in renamed {
            let Some(new_path) = self.manager.photo(id).map(Photo::path) else {
                continue;
            };
            outcomes.push(self.rename_file(old_path, new_path));
        }
        if self.working.is_some() && self.working_photo().is_none() {
            debug!("working photo was dropped by a rename");
            self.working = None;
            self.reset_actions();
        }
        outcomes
    }

    /// Viewed images tied for the most tags, in registration order.
    pub fn most_tagged_viewing(&self) -> Vec<PathBuf> {
        let candidates: Vec<PhotoId> = self
            .viewing
            .iter()
            .filter_map(|path| self.photo_at(path))
            .map(Photo::id)
            .collect();
        self.manager
            .most_tagged_in(candidates)
            .into_iter()
            .filter_map(|id| self.manager.photo(id))
            .map(Photo::path)
            .collect()
    }

    fn rename_file(&mut self, from: PathBuf, to: PathBuf) -> CommitOutcome {
        if from == to {
            return CommitOutcome::Unchanged { path: to };
        }

        if self.viewing.contains(&to) {
            self.viewing.retain(|p| *p != from);
        } else {
            for path in self.viewing.iter_mut().filter(|p| **p == from) {
                *path = to.clone();
            }
        }

        match self.renamer.rename(&self.root.join(&from), &self.root.join(&to)) {
            Ok(()) => {
                info!(from = %from.display(), to = %to.display(), "renamed");
                CommitOutcome::Renamed { from, to }
            }
            Err(e) => {
                warn!(from = %from.display(), to = %to.display(), error = %e, "rename failed");
                CommitOutcome::RenameFailed {
                    from,
                    to,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn reset_actions(&mut self) {
        self.tagging.reset(&self.manager, self.working);
        self.reverting.reset(&self.manager, self.working);
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Split a root-relative path into `(file name, parent directory)`.
fn split_path(relative: &Path) -> (String, PathBuf) {
    let name = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = relative.parent().map(Path::to_path_buf).unwrap_or_default();
    (name, dir)
}
