//! Registry configuration loaded from TOML.
//!
//! Every section carries serde defaults, so an empty file is a valid
//! configuration. `validate` runs after every load.


use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

///
/// RegistryConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub listing: ListingConfig,
    pub history: HistoryConfig,
    pub search: SearchConfig,
    pub sync: SyncConfig,
}

impl RegistryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listing.per_page == 0 {
            return Err(ConfigError::invalid("listing.per_page", "must be at least 1"));
        }
        if self.search.max_query_len == 0 {
            return Err(ConfigError::invalid(
                "search.max_query_len",
                "must be at least 1",
            ));
        }
        if self.sync.short_id_len == 0 {
            return Err(ConfigError::invalid("sync.short_id_len", "must be at least 1"));
        }
        if let Some(name) = self
            .history
            .suppressed_fields
            .iter()
            .find(|name| name.trim().is_empty())
        {
            return Err(ConfigError::invalid(
                "history.suppressed_fields",
                format!("contains a blank field name {name:?}"),
            ));
        }

        Ok(())
    }
}

///
/// ListingConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    pub per_page: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { per_page: 20 }
    }
}

///
/// HistoryConfig
///
/// Fields whose edits never produce a history entry. Only the orientation
/// field is suppressed unless configured otherwise.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    pub suppressed_fields: Vec<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            suppressed_fields: vec!["photo_orientation".to_string()],
        }
    }
}

///
/// SearchConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub max_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_query_len: 150 }
    }
}

///
/// SyncConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Trailing unique-identifier characters that form a short id.
    pub short_id_len: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { short_id_len: 7 }
    }
}
