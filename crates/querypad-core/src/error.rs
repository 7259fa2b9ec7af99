use thiserror::Error;

/// Top-level error type for the Querypad system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates convert
/// their own errors into `QuerypadError` so that the `?` operator works
/// seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuerypadError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Remote backend error: {0}")]
    Remote(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for QuerypadError {
    fn from(err: toml::de::Error) -> Self {
        QuerypadError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for QuerypadError {
    fn from(err: toml::ser::Error) -> Self {
        QuerypadError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for QuerypadError {
    fn from(err: serde_json::Error) -> Self {
        QuerypadError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Querypad operations.
pub type Result<T> = std::result::Result<T, QuerypadError>;
