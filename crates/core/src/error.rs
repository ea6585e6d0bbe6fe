//! Core error types

use thiserror::Error;

/// Core Result type
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Engine configuration already installed")]
    ConfigAlreadyInstalled,

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Check if this error came from reading or parsing a config source
    pub fn is_config_source(&self) -> bool {
        matches!(self, CoreError::ConfigParse(_) | CoreError::Io(_))
    }
}
