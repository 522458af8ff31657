use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

/// Performs the physical rename that follows a logical one.
pub trait FileRenamer {
    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Renames files on the local file system. Never overwrites an existing file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsRenamer;

impl FileRenamer for FsRenamer {
    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        if to.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        fs::rename(from, to)?;
        debug!(from = %from.display(), to = %to.display(), "file renamed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rename_moves_file() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("img.jpg");
        let to = temp.path().join("img@Apple.jpg");
        fs::write(&from, "data").unwrap();

        FsRenamer.rename(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "data");
    }

    #[test]
    fn test_rename_refuses_existing_target() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("a.jpg");
        let to = temp.path().join("b.jpg");
        fs::write(&from, "a").unwrap();
        fs::write(&to, "b").unwrap();

        let err = FsRenamer.rename(&from, &to).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&to).unwrap(), "b");
        assert!(from.exists());
    }

    #[test]
    fn test_rename_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let result = FsRenamer.rename(&temp.path().join("gone.jpg"), &temp.path().join("x.jpg"));
        assert!(result.is_err());
    }
}
