//! Site configuration.
//!
//! The site config is an untyped key/value store read from `config.yaml`.
//! Any key may hold any YAML shape; the handful of keys the build itself
//! understands (`title`, `copyAssets`, `minify`) are read through typed
//! accessors, everything else is handed to templates unchanged.
//!
//! - Store type and accessors (this module)
//! - Loading, saving and merging config files (`load`)

mod load;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_yaml::Value;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("config file {0} must contain a mapping at the top level")]
    NotAMapping(PathBuf),

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

// =============================================================================
// Well-known keys
// =============================================================================

pub const TITLE_KEY: &str = "title";
pub const COPY_ASSETS_KEY: &str = "copyAssets";
pub const MINIFY_KEY: &str = "minify";

/// Value returned by [`ConfigStore::get`] for unknown keys.
static ABSENT: Value = Value::Null;

// =============================================================================
// Store
// =============================================================================

/// Mutable key/value store backing a site's `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    entries: BTreeMap<String, Value>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a single top-level key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Prepend `value` to the sequence stored at `key`.
    ///
    /// An absent key starts out as an empty sequence. A key holding a
    /// non-sequence value is replaced by a sequence whose first element is
    /// `value` followed by the previous value.
    pub fn add_to_array(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let slot = self
            .entries
            .entry(key.into())
            .or_insert_with(|| Value::Sequence(Vec::new()));

        match slot {
            Value::Sequence(items) => items.insert(0, value.into()),
            other => {
                let previous = std::mem::replace(other, Value::Null);
                *other = Value::Sequence(vec![value.into(), previous]);
            }
        }
    }

    /// Read a key. Unknown keys yield `Value::Null` rather than an error.
    pub fn get(&self, key: &str) -> &Value {
        self.entries.get(key).unwrap_or(&ABSENT)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }

    /// The site title, if configured as a string.
    pub fn title(&self) -> Option<&str> {
        self.get(TITLE_KEY).as_str()
    }

    /// Whether rendered pages should be minified.
    pub fn minify(&self) -> bool {
        is_truthy(self.get(MINIFY_KEY))
    }
}

/// Loose truthiness for config flags: `null`, `false`, `0` and `""` are false,
/// everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}
