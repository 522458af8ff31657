//! Tag photos by renaming them.
//!
//! Each image's file name is derived from its tag set as
//! `<base>(@<tag>)*.<ext>`, and every name it has held can be restored later.

pub mod action;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod manager;
pub mod naming;
pub mod photo;
pub mod renamer;
pub mod scanner;
pub mod session;
pub mod snapshot;
pub mod tag;

pub use action::{Action, ActionMode, ActionView, RevertingAction, TaggingAction};
pub use error::{RenamerError, Result};
pub use manager::{Manager, ManagerEvent, TagSetChange};
pub use photo::{Photo, PhotoId};
pub use session::{CommitOutcome, Session};
pub use tag::Tag;
