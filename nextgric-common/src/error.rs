//! Error types for nextgric

use thiserror::Error;

/// Error types shared by the nextgric crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed identifier or value that cannot be encoded.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Network and file I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}
