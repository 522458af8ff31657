use std::path::Path;

use anyhow::Result;

use super::open_library;

/// Info about an image for display purposes
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoInfo {
    pub path: String,
    pub tags: Vec<String>,
}

/// Options for filtering the image list
#[derive(Debug, Default)]
pub struct ListOptions {
    pub tag: Option<String>,
}

/// List the library's images with their tags, optionally filtered by tag
pub fn run_list(library_path: &Path, options: ListOptions) -> Result<Vec<PhotoInfo>> {
    let session = open_library(library_path)?;

    let mut result = Vec::new();
    for path in session.viewing_images() {
        let tags: Vec<String> = session
            .photo_at(path)
            .map(|photo| photo.tags().iter().cloned().collect())
            .unwrap_or_default();

        if let Some(tag) = &options.tag {
            if !tags.contains(tag) {
                continue;
            }
        }

        result.push(PhotoInfo {
            path: path.to_string_lossy().to_string(),
            tags,
        });
    }

    Ok(result)
}

/// The images tied for the most tags, in the order they were first registered
pub fn run_most_tagged(library_path: &Path) -> Result<Vec<PhotoInfo>> {
    let session = open_library(library_path)?;

    let result = session
        .most_tagged_viewing()
        .into_iter()
        .map(|path| PhotoInfo {
            tags: session
                .photo_at(&path)
                .map(|photo| photo.tags().iter().cloned().collect())
                .unwrap_or_default(),
            path: path.to_string_lossy().to_string(),
        })
        .collect();

    Ok(result)
}
