use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Extensions treated as renameable images, compared case-insensitively
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "tif", "tiff", "jpg", "jpeg", "bmp", "gif"];

/// Check if a path names an image by its extension
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Information about a scanned image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedImage {
    pub path: PathBuf,
    /// Path relative to the scan root
    pub relative_path: PathBuf,
    pub filename: String,
    /// Parent directory relative to the scan root; empty for the root itself
    pub directory: PathBuf,
}

/// Walk a directory tree and collect image files
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Scan all image files below the root, skipping hidden entries.
    /// Order is not guaranteed.
    pub fn scan_images(&self) -> Vec<ScannedImage> {
        let mut images = Vec::new();
        for entry in WalkDir::new(&self.root).into_iter().filter_entry(|e| !is_hidden(e)) {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_file() {
                continue;
            }
            if !is_image(entry.path()) {
                continue;
            }
            if let Some(scanned) = self.make_scanned_image(&entry) {
                images.push(scanned);
            }
        }
        images
    }

    fn make_scanned_image(&self, entry: &DirEntry) -> Option<ScannedImage> {
        let path = entry.path().to_path_buf();
        let relative_path = path.strip_prefix(&self.root).ok()?.to_path_buf();
        let filename = entry.file_name().to_str()?.to_string();

        let directory = relative_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Some(ScannedImage {
            path,
            relative_path,
            filename,
            directory,
        })
    }
}

/// Check if a directory entry is hidden (starts with .)
/// Never considers the root entry (depth 0) as hidden.
fn is_hidden(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_image() {
        for name in ["a.png", "a.tif", "a.TIFF", "a.jpg", "a.JPG", "a.jpeg", "a.bmp", "a.gif"] {
            assert!(is_image(Path::new(name)), "{name} should be an image");
        }
        assert!(!is_image(Path::new("video.mp4")));
        assert!(!is_image(Path::new("photo.cr2")));
        assert!(!is_image(Path::new("noext")));
    }

    #[test]
    fn test_scanner_finds_nested_images() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("trip/day1")).unwrap();
        fs::write(root.join("top.png"), "data").unwrap();
        fs::write(root.join("trip/day1/beach.JPG"), "data").unwrap();
        fs::write(root.join("trip/notes.txt"), "not an image").unwrap();

        let scanner = Scanner::new(root.to_path_buf());
        let mut images = scanner.scan_images();
        images.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].relative_path, PathBuf::from("top.png"));
        assert_eq!(images[0].directory, PathBuf::new());
        assert_eq!(images[1].relative_path, PathBuf::from("trip/day1/beach.JPG"));
        assert_eq!(images[1].directory, PathBuf::from("trip/day1"));
        assert_eq!(images[1].filename, "beach.JPG");
        assert_eq!(images[1].path, root.join("trip/day1/beach.JPG"));
    }

    #[test]
    fn test_is_hidden_respects_depth() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join(".hidden")).unwrap();

        let entries: Vec<_> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .collect();

        let root_entry = entries.iter().find(|e| e.depth() == 0).unwrap();
        assert!(!is_hidden(root_entry), "Root at depth 0 should never be hidden");

        let hidden = entries
            .iter()
            .find(|e| e.file_name().to_string_lossy() == ".hidden")
            .unwrap();
        assert!(is_hidden(hidden));
    }

    #[test]
    fn test_scanner_skips_hidden() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("visible")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::write(root.join("visible/photo.jpg"), "data").unwrap();
        fs::write(root.join(".hidden/secret.jpg"), "hidden").unwrap();
        fs::write(root.join("visible/.hidden.jpg"), "hidden file").unwrap();

        let images = Scanner::new(root.to_path_buf()).scan_images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].filename, "photo.jpg");
    }
}
