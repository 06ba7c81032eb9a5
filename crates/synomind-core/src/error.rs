//! Error types for the SynoMind core.
//!
//! Only [`CoreError::Validation`] is meant to reach a client as-is. Configuration problems are
//! surfaced through health checks, generation failures become the fixed apology text, and store
//! failures trigger a per-request fallback to synthetic data.

use thiserror::Error;

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Weight artifact could not be located or provisioned.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Remote backend credential is not configured.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Local engine failed to load. Not cached; the next call retries.
    #[error("Engine initialization failed: {0}")]
    Initialization(String),

    /// Timeout, transport failure, malformed or empty backend output.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Missing or out-of-range request field.
    #[error("{0}")]
    Validation(String),

    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// ConfigurationError class: reported via health check, never per request.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CoreError::ModelUnavailable(_) | CoreError::MissingCredential(_) | CoreError::Config(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }
}

impl From<sled::Error> for CoreError {
    fn from(err: sled::Error) -> Self {
        CoreError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CoreError::Generation(format!("request timed out: {}", err))
        } else {
            CoreError::Generation(err.to_string())
        }
    }
}
