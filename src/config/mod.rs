//! Configuration structures and loading utilities.
//!
//! This module contains the security policy configuration, its presets and
//! the loaders for environment variables and JSON files.

pub mod secure;

pub use secure::*;

/// Errors raised while loading a [`SecureConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a boolean, got {value:?}")]
    InvalidBool { var: String, value: String },

    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: String, value: String },

    #[error("proxy header entry {entry:?} is not of the form Name=value")]
    InvalidProxyHeader { entry: String },

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}
