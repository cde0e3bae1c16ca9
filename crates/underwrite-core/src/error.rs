//! Error types for Underwrite Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Type error for attribute '{attribute}': expected {expected}, got {actual}")]
    TypeError {
        attribute: String,
        expected: &'static str,
        actual: String,
    },

    #[error("Attribute is computed and cannot be set: {0}")]
    ReadOnlyAttribute(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
