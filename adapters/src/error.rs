//! Adapter error types

use thiserror::Error;

pub use shared::ParameterError;

/// Result type for adapter execution
pub type AdapterResult<T> = Result<T, TaskFailure>;

/// Execution-time failure of a single task
///
/// These never cross the task boundary as errors; the task stores their
/// rendered message as its failed outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    #[error("{status} - {body}")]
    Transport { status: u16, body: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request could not be built: {message}")]
    Request { message: String },

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    #[error("Provider job failed: {message}")]
    JobFailed { message: String },

    #[error("Polling gave up after {attempts} attempts")]
    PollExhausted { attempts: u32 },
}

impl TaskFailure {
    pub fn unexpected(message: impl Into<String>) -> Self {
        TaskFailure::UnexpectedResponse { message: message.into() }
    }
}
