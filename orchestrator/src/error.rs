//! Orchestrator-specific error types

use thiserror::Error;

use adapters::ParameterError;
use shared::SharedError;

/// Construction-time and catastrophic errors
///
/// Task-level failures never show up here; they are stored as the task's
/// outcome instead.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Invalid task label: {reason}")]
    InvalidLabel { reason: String },

    #[error("Unknown provider '{provider}' for task '{label}'")]
    UnknownProvider { label: String, provider: String },

    #[error("Invalid parameter '{field}' for task '{label}': {reason}")]
    InvalidParameter { label: String, field: String, reason: String },

    #[error("Resource not found for task '{label}': {field} -> {path}")]
    ResourceNotFound { label: String, field: String, path: String },

    #[error("Task label already present in the batch: {label}")]
    DuplicateLabel { label: String },

    #[error("Batch capacity exceeded: {current} + {requested} > {capacity}")]
    CapacityExceeded {
        current: usize,
        requested: usize,
        capacity: usize,
    },

    #[error("Invalid batch size {size}: expected 1..={capacity}")]
    InvalidBatchSize { size: usize, capacity: usize },

    #[error("Malformed batch: {message}")]
    MalformedBatch { message: String },

    #[error("Task '{label}' was not validated before construction")]
    NotVerified { label: String },

    #[error("Task could not be joined: {message}")]
    TaskJoin { message: String },

    #[error("Configuration error: {field}: {message}")]
    Config { field: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OrchestratorError {
    /// Attach a task label to an adapter validation failure
    pub fn from_parameter(label: &str, error: ParameterError) -> Self {
        match error {
            ParameterError::Missing { field } => OrchestratorError::InvalidParameter {
                label: label.to_string(),
                field,
                reason: "missing required value".to_string(),
            },
            ParameterError::Invalid { field, reason } => OrchestratorError::InvalidParameter {
                label: label.to_string(),
                field,
                reason,
            },
            ParameterError::ResourceNotFound { field, path } => OrchestratorError::ResourceNotFound {
                label: label.to_string(),
                field,
                path,
            },
        }
    }

    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        OrchestratorError::Config {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<SharedError> for OrchestratorError {
    fn from(error: SharedError) -> Self {
        match error {
            SharedError::NonStringLabel { found } => OrchestratorError::InvalidLabel {
                reason: format!("label must be a string, found {found}"),
            },
            other => OrchestratorError::MalformedBatch {
                message: other.to_string(),
            },
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
