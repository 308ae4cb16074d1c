use std::path::Path;

use thiserror::Error;

/// Errors surfaced by the bridge outside of per-request RPC error replies.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration value is invalid or the file could not be used.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Underlying socket or filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML content could not be parsed.
    #[error("{0}")]
    TomlParse(String),

    /// Tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Tracing(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Builds a TOML parse error, including the offending path when known.
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                BridgeError::TomlParse(format!("Failed to parse TOML at {clean_path:?}: {error}"))
            }
            None => BridgeError::TomlParse(format!("Failed to parse TOML: {error}")),
        }
    }
}
