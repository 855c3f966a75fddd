//! Model configuration, optionally loaded from a TOML file.
//!
//! ```toml
//! max_depth = 32
//! date_format = "%Y-%m-%d"
//! ```

use crate::error::ModelResult;
use modelkit_types::date::CANONICAL_FORMAT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Settings applied by [`crate::Serializer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Deepest relation nesting serialized before giving up.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// `strftime` pattern for date attributes.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_max_depth() -> usize {
    64
}

fn default_date_format() -> String {
    CANONICAL_FORMAT.to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            date_format: default_date_format(),
        }
    }
}

impl ModelConfig {
    /// Parses configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(contents: &str) -> ModelResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a configuration file.
    pub fn try_load_from(path: impl AsRef<Path>) -> ModelResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file is missing, unreadable or malformed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No model config found at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded model config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to load model config {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }
}
