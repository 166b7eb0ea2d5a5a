//! Content discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::document::DocumentError;

/// Extension of every template, partial and page file.
pub const CONTENT_EXTENSION: &str = "html";

/// Recursively list the `*.html` files under `dir`, sorted by path.
///
/// A missing directory simply has no content.
pub fn content_files(dir: &Path) -> Result<Vec<PathBuf>, DocumentError> {
    if !dir.is_dir() {
        tracing::debug!("{} does not exist, nothing to load", dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| DocumentError::Discover {
            path: dir.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some(CONTENT_EXTENSION) {
            continue;
        }

        files.push(entry.into_path());
    }

    Ok(files)
}
