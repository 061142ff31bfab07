//! Configuration loading and management.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    /// Username/password pairs for the login gate. An empty map disables
    /// the gate entirely. This is a convenience check for a
    /// single-operator tool, not real authentication.
    #[serde(default)]
    pub credentials: HashMap<String, String>,
}

/// Record-store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the per-user accumulated record files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".opsboard")
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default location or fall back to
    /// defaults plus environment variables.
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::load(".opsboard/config.yaml") {
            return config;
        }

        let mut config = Self::default();
        if let Ok(dir) = std::env::var("OPSBOARD_DATA_DIR") {
            config.store.data_dir = PathBuf::from(dir);
        }
        config
    }

    /// Ensure the data directory exists.
    pub fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.store.data_dir)?;
        Ok(())
    }
}
