//! Bridge configuration: listen address and artwork base URL.

mod paths;

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::core::{BridgeError, Result};

pub use paths::ConfigPaths;

/// Main configuration structure for the bridge.
///
/// Loaded from a TOML file; every field has a default so a partial
/// (or missing) file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// TCP listener settings for the RPC peer side.
    #[serde(default)]
    pub server: ServerConfig,

    /// Artwork URL completion settings.
    #[serde(default)]
    pub art: ArtConfig,
}

/// Where the bridge listens for RPC peer connections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// How relative artwork references are completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtConfig {
    /// Prefix applied to artwork references that are not absolute URLs.
    /// Empty means relative references are passed through unchanged.
    #[serde(default)]
    pub base_url: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5679
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ArtConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file.
    ///
    /// A default file is written first when the path does not exist, so the
    /// user has something concrete to edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or created, or if the
    /// TOML content is invalid.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            Self::write_default(path)?;
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BridgeError::toml_parse(e, Some(path)))
    }

    fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string(&Config::default())
            .map_err(|e| BridgeError::Config(format!("Failed to serialize defaults: {e}")))?;
        fs::write(path, content)?;
        Ok(())
    }
}
