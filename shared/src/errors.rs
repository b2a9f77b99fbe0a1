//! Shared error types for the generation orchestration system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },

    #[error("Malformed batch: {message}")]
    MalformedBatch { message: String },

    #[error("Task label must be a string, found {found}")]
    NonStringLabel { found: String },
}

pub type SharedResult<T> = Result<T, SharedError>;

/// Why a parameter bag was rejected by an adapter's validation step
///
/// Only required values produce these; invalid optional values are replaced
/// by provider defaults instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("Missing required parameter: {field}")]
    Missing { field: String },

    #[error("Invalid required parameter {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Resource not found for parameter {field}: {path}")]
    ResourceNotFound { field: String, path: String },
}

impl ParameterError {
    /// Name of the offending parameter
    pub fn field(&self) -> &str {
        match self {
            ParameterError::Missing { field }
            | ParameterError::Invalid { field, .. }
            | ParameterError::ResourceNotFound { field, .. } => field,
        }
    }
}
