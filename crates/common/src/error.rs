//! Error types for Kinoprobe configuration

use thiserror::Error;

/// Result type alias using Kinoprobe Error
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and reporting errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: String, value: String },
}
