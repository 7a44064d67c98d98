//! Error handling module for guidepost
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Only loading and persistence paths produce errors; tour transitions never do.

use thiserror::Error;

/// Main error type for guidepost
#[derive(Error, Debug)]
pub enum GuidepostError {
    /// IO errors (state files, flow files, terminal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Flow registry errors (duplicate ids, mixed step kinds, empty flows)
    #[error("Flow registry error: {0}")]
    Registry(String),

    /// Completion store errors (unreadable or unwritable state)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Terminal errors (drawing frames, reading input)
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type alias for guidepost operations
pub type Result<T> = std::result::Result<T, GuidepostError>;

impl GuidepostError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a flow registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }
}
