use thiserror::Error;

/// Top-level error type for input-from-web.
///
/// Crate-local errors (injection, dispatch, authentication) implement
/// `From<...> for IfwError` so the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IfwError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Injection error: {0}")]
    Injection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for IfwError {
    fn from(err: toml::de::Error) -> Self {
        IfwError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for IfwError {
    fn from(err: toml::ser::Error) -> Self {
        IfwError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for IfwError {
    fn from(err: serde_json::Error) -> Self {
        IfwError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for input-from-web operations.
pub type Result<T> = std::result::Result<T, IfwError>;
