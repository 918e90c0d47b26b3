//! Engine configuration and the external settings store.
//!
//! ```toml
//! min_text_len = 2
//! skip_classes = ["QueryBuilder-StyledInputContent"]
//! button_is_editable = false
//! label_is_editable = false
//!
//! [settings]
//! auto_mode = true
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings key that turns on ongoing observation after the initial pass.
pub const AUTO_MODE_KEY: &str = "auto_mode";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Text leaves shorter than this many characters are never rewritten.
    pub min_text_len: usize,
    /// Elements carrying any of these classes are skipped with their subtree.
    pub skip_classes: Vec<String>,
    pub button_is_editable: bool,
    pub label_is_editable: bool,
    /// Persisted key-value settings, read through [`ConfigStore`].
    pub settings: toml::Table,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_text_len: 2,
            skip_classes: vec!["QueryBuilder-StyledInputContent".to_string()],
            button_is_editable: false,
            label_is_editable: false,
            settings: toml::Table::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EngineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// The `[settings]` table as a read-only store.
    pub fn settings_store(&self) -> TomlStore {
        TomlStore {
            table: self.settings.clone(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("settings store is unavailable")]
    Unavailable,
    #[error("setting `{key}` is a {found}, expected a boolean")]
    WrongType { key: String, found: &'static str },
}

/// Read-only view of the host's persisted settings.
pub trait ConfigStore {
    fn get_bool(&self, key: &str) -> Result<Option<bool>, StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: bool) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

impl ConfigStore for MemoryStore {
    fn get_bool(&self, key: &str) -> Result<Option<bool>, StoreError> {
        Ok(self.values.get(key).copied())
    }
}

/// A store that always fails, standing in for a host without settings.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableStore;

impl ConfigStore for UnavailableStore {
    fn get_bool(&self, _key: &str) -> Result<Option<bool>, StoreError> {
        Err(StoreError::Unavailable)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TomlStore {
    table: toml::Table,
}

impl ConfigStore for TomlStore {
    fn get_bool(&self, key: &str) -> Result<Option<bool>, StoreError> {
        match self.table.get(key) {
            None => Ok(None),
            Some(toml::Value::Boolean(value)) => Ok(Some(*value)),
            Some(other) => Err(StoreError::WrongType {
                key: key.to_string(),
                found: other.type_str(),
            }),
        }
    }
}

/// Reads the auto-mode flag. A missing key or a failing store means `false`.
pub fn read_auto_mode(store: &dyn ConfigStore) -> bool {
    match store.get_bool(AUTO_MODE_KEY) {
        Ok(Some(value)) => value,
        Ok(None) => {
            log::debug!(target: "engine", "{AUTO_MODE_KEY} not set; observation stays off");
            false
        }
        Err(err) => {
            log::debug!(target: "engine", "cannot read {AUTO_MODE_KEY}: {err}; observation stays off");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.min_text_len, 2);
        assert_eq!(config.skip_classes, vec!["QueryBuilder-StyledInputContent"]);
    }

    #[test]
    fn parses_all_fields() {
        let config = EngineConfig::from_toml_str(
            r#"
            min_text_len = 3
            skip_classes = ["no-slop", "editor"]
            button_is_editable = true
            label_is_editable = true

            [settings]
            auto_mode = true
            "#,
        )
        .unwrap();
        assert_eq!(config.min_text_len, 3);
        assert_eq!(config.skip_classes, vec!["no-slop", "editor"]);
        assert!(config.button_is_editable);
        assert!(config.label_is_editable);
        assert!(read_auto_mode(&config.settings_store()));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = EngineConfig::from_toml_str("min_txt_len = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn auto_mode_defaults_to_off() {
        assert!(!read_auto_mode(&MemoryStore::new()));
        assert!(!read_auto_mode(&UnavailableStore));
        assert!(read_auto_mode(&MemoryStore::new().with(AUTO_MODE_KEY, true)));
        assert!(!read_auto_mode(&MemoryStore::new().with(AUTO_MODE_KEY, false)));
    }

    #[test]
    fn non_boolean_setting_is_an_error_and_reads_as_off() {
        let config = EngineConfig::from_toml_str("[settings]\nauto_mode = \"yes\"").unwrap();
        let store = config.settings_store();
        assert_eq!(
            store.get_bool(AUTO_MODE_KEY),
            Err(StoreError::WrongType {
                key: AUTO_MODE_KEY.to_string(),
                found: "string",
            })
        );
        assert!(!read_auto_mode(&store));
    }
}
