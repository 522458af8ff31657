use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the tagging core and its session.
#[derive(Debug, Error)]
pub enum RenamerError {
    /// An action was asked to toggle an option that does not exist.
    #[error("no option at index {index} ({len} options available)")]
    OptionOutOfRange { index: usize, len: usize },

    /// A user-entered tag name contains characters other than letters and digits.
    #[error("invalid tag name '{0}': use letters and digits only")]
    InvalidTagName(String),

    /// A path was used as the working file without being among the viewed images.
    #[error("{} is not among the images being viewed", .0.display())]
    NotViewing(PathBuf),

    /// A restored snapshot violates a registry or naming invariant.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

pub type Result<T> = std::result::Result<T, RenamerError>;
