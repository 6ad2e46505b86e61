//! Validator configuration.
//!
//! Passed explicitly to [`crate::Validator::new`]; nothing here is global.
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_DISCRIMINATOR: &str = "constr";
pub const DEFAULT_MAX_DEFINITION_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Key naming the variant on tagged-union values.
    pub discriminator: String,
    /// Emit `tracing` debug events for expansions and failures.
    pub debug: bool,
    /// How many distinct instantiations the definition validator may nest
    /// before giving up on a definition.
    pub max_definition_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discriminator: DEFAULT_DISCRIMINATOR.to_string(),
            debug: false,
            max_definition_depth: DEFAULT_MAX_DEFINITION_DEPTH,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },
}

impl Config {
    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        from_str_with_path(src)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&src)
    }
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ConfigError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| ConfigError::Parse {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}
