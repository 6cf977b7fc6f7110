use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::brain::{BrainConfig, StoreConfig};
use crate::error::ConfigError;
use crate::eval::EvalWeights;
use crate::search::SearchConfig;

/// All tunables in one document. Every section and field is optional in the
/// JSON file; missing values take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub eval: EvalWeights,
    pub brain: BrainConfig,
    pub search: SearchConfig,
    pub store: StoreConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Defaults, or the file's contents when a path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
