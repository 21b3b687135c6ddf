//! Custom error types for Savant
//!
//! Provides a unified error handling system across all modules.
//!
//! Tool-level failures (unknown tool, capability error, per-call timeout) are
//! deliberately absent here: they are captured as failed `ToolResult`s and fed
//! back to the model rather than ending the turn.

use thiserror::Error;

/// Main error type for Savant operations
#[derive(Error, Debug)]
pub enum SavantError {
    /// Model adapter call failed (network, quota, malformed response)
    #[error("Model adapter error: {0}")]
    Adapter(String),

    /// Model adapter call exceeded the configured timeout
    #[error("Model call timed out after {0}s")]
    AdapterTimeout(u64),

    /// Think/act cycle count exceeded for one turn
    #[error("Turn exceeded the maximum of {0} think/act cycles")]
    IterationLimitExceeded(usize),

    /// A second turn was attempted on a session already mid-turn
    #[error("Session '{0}' is already processing a turn")]
    SessionBusy(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model backend credential is absent
    #[error("GEMINI_API_KEY is not set. Export it or add it to a .env file")]
    MissingApiKey,

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Savant operations
pub type Result<T> = std::result::Result<T, SavantError>;

impl SavantError {
    /// Create a model adapter error
    pub fn adapter(msg: impl Into<String>) -> Self {
        Self::Adapter(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
