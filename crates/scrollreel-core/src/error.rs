/// Core error types for scrollreel.
use crate::color::ColorError;

/// A specialized Result type for scrollreel operations.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error type encompassing all scrollreel subsystems.
#[derive(Debug, thiserror::Error)]
pub enum ReelError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("asset error: {message} ({url})")]
    Asset { message: String, url: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ReelError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ReelError::Config(message.into())
    }

    /// Create an asset error tied to the URL it was fetched from.
    pub fn asset(message: impl Into<String>, url: impl Into<String>) -> Self {
        ReelError::Asset {
            message: message.into(),
            url: url.into(),
        }
    }
}

impl From<ColorError> for ReelError {
    fn from(err: ColorError) -> Self {
        ReelError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for ReelError {
    fn from(err: toml::de::Error) -> Self {
        ReelError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ReelError {
    fn from(err: toml::ser::Error) -> Self {
        ReelError::Config(err.to_string())
    }
}
