//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Parser error
    #[error("Parser error: {0}")]
    ParseError(#[from] underwrite_parser::ParseError),

    /// Structural defect in a tree, catalog or strategy
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] underwrite_runtime::ConfigurationError),

    /// Core data error (override type mismatch, computed attribute write)
    #[error("Data error: {0}")]
    CoreError(#[from] underwrite_core::CoreError),

    /// Override key known to neither the rule input nor the routing context
    #[error("Unknown override attribute: {0}")]
    UnknownOverride(String),

    /// Replay batch exceeds the configured bound
    #[error("Batch of {size} applications exceeds the maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
