//! Reading and writing config files.

use std::collections::BTreeMap;
use std::path::Path;

use serde_yaml::Value;

use super::{ConfigError, ConfigStore};

impl ConfigStore {
    /// Load a store from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut store = Self::new();
        store.load(path)?;
        Ok(store)
    }

    /// Replace every entry with the contents of the YAML file at `path`.
    ///
    /// An empty file loads as an empty store. Anything other than a mapping
    /// at the top level is rejected.
    pub fn load(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let value: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        self.entries = match value {
            Value::Null => BTreeMap::new(),
            Value::Mapping(mapping) => mapping
                .into_iter()
                .map(|(key, value)| match key {
                    Value::String(key) => Ok((key, value)),
                    other => scalar_key(&other)
                        .map(|key| (key, value))
                        .ok_or_else(|| ConfigError::NotAMapping(path.to_path_buf())),
                })
                .collect::<Result<BTreeMap<_, _>, ConfigError>>()?,
            _ => return Err(ConfigError::NotAMapping(path.to_path_buf())),
        };

        Ok(())
    }

    /// Write every entry to `path` as YAML, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_yaml::to_string(&self.entries)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Shallow merge: every top-level key of `other` replaces the same key
    /// here. Nested mappings are not merged.
    pub fn merge_from(&mut self, other: ConfigStore) {
        self.entries.extend(other.entries);
    }
}

/// Render a non-string scalar mapping key (`1: foo`, `true: bar`) as a string.
fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
