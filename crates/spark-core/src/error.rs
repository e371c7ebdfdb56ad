//! Error types for Spark

use thiserror::Error;

/// The main error type for Spark operations
#[derive(Debug, Error)]
pub enum SparkError {
    #[error("Image list can not be empty")]
    EmptyImageSource,

    #[error("Frame animation must contain at least one frame")]
    EmptyAnimation,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Spark operations
pub type Result<T> = std::result::Result<T, SparkError>;

impl From<toml::de::Error> for SparkError {
    fn from(err: toml::de::Error) -> Self {
        SparkError::TomlParseError(err.to_string())
    }
}
