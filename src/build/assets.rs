//! Asset directory copying.
//!
//! `copyAssets` in the site config lists directories copied verbatim into
//! the output:
//!
//! ```yaml
//! copyAssets:
//!   - assets              # site/assets -> dist-site/assets
//!   - [static, public]    # site/static -> dist-site/public
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use walkdir::WalkDir;

use crate::config::{COPY_ASSETS_KEY, ConfigStore};

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("asset source directory does not exist: {0}")]
    MissingSource(PathBuf),

    #[error("invalid copyAssets entry: {0}")]
    InvalidEntry(String),

    #[error("failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// One `copyAssets` entry: a directory under the site root and the name it
/// is copied to under the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    pub source: String,
    pub dest: String,
}

/// Accepted shapes of a `copyAssets` entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum AssetEntry {
    Plain(String),
    Renamed(String, String),
}

impl AssetSpec {
    /// A plain name copies to the same name; a two-element sequence
    /// renames on copy.
    pub fn from_value(value: &Value) -> Result<Self, AssetError> {
        let (source, dest) = match serde_yaml::from_value(value.clone()) {
            Ok(AssetEntry::Plain(name)) => (name.clone(), name),
            Ok(AssetEntry::Renamed(source, dest)) => (source, dest),
            Err(_) => return Err(invalid(value)),
        };

        let (source, dest) = (source.trim(), dest.trim());
        if source.is_empty() || dest.is_empty() {
            return Err(invalid(value));
        }

        Ok(Self {
            source: source.to_string(),
            dest: dest.to_string(),
        })
    }
}

fn invalid(value: &Value) -> AssetError {
    AssetError::InvalidEntry(
        serde_yaml::to_string(value)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| format!("{value:?}")),
    )
}

/// Read the `copyAssets` list. An absent key means nothing to copy; a single
/// scalar is taken as a one-entry list.
pub fn asset_specs(config: &ConfigStore) -> Result<Vec<AssetSpec>, AssetError> {
    if !config.has(COPY_ASSETS_KEY) {
        return Ok(Vec::new());
    }

    match config.get(COPY_ASSETS_KEY) {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(entries) => entries.iter().map(AssetSpec::from_value).collect(),
        other => Ok(vec![AssetSpec::from_value(other)?]),
    }
}

/// Recursively copy `source` into `dest`, creating directories as needed.
/// Returns the number of files copied.
pub fn copy_dir(source: &Path, dest: &Path) -> Result<usize, AssetError> {
    if !source.is_dir() {
        return Err(AssetError::MissingSource(source.to_path_buf()));
    }

    let mut copied = 0;
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| AssetError::Walk {
            path: source.to_path_buf(),
            source: e,
        })?;

        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| AssetError::Copy {
                path: target.clone(),
                source: e,
            })?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| AssetError::Copy {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| AssetError::Copy {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}
