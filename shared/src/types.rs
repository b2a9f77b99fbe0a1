//! Core shared types: task descriptors, parameter bags and task outcomes

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::{SharedError, SharedResult};

/// Open parameter bag handed to a provider adapter.
///
/// The orchestrator never interprets keys beyond the reserved ones listed in
/// [`reserved`]; everything else belongs to the adapter that validates it.
pub type Parameters = serde_json::Map<String, Value>;

/// Parameter keys the core understands regardless of provider
pub mod reserved {
    /// Overrides the provider's default model
    pub const MODEL: &str = "model";
    /// Overrides the catalog credential for one task
    pub const API_KEY: &str = "api_key";
    /// Overrides the provider endpoint for one task
    pub const BASE_URL: &str = "base_url";
}

/// One unit of work: a label, a provider key and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    label: String,
    provider: String,
    #[serde(default)]
    parameters: Parameters,
}

impl TaskDescriptor {
    pub fn new(label: impl Into<String>, provider: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            label: label.into(),
            provider: provider.into(),
            parameters,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Hand the parameter bag over to whoever validates it
    pub fn into_parts(self) -> (String, String, Parameters) {
        (self.label, self.provider, self.parameters)
    }
}

/// Terminal value of a task
///
/// Execution-time failures never escape a task; they land here as `Failed`
/// with a descriptive message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TaskOutcome {
    Completed(Value),
    Failed(String),
}

impl TaskOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }

    /// Completed payload, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            TaskOutcome::Completed(value) => Some(value),
            TaskOutcome::Failed(_) => None,
        }
    }

    /// Failure message, if any
    pub fn failure(&self) -> Option<&str> {
        match self {
            TaskOutcome::Completed(_) => None,
            TaskOutcome::Failed(message) => Some(message),
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Completed(value) => write!(f, "completed: {value}"),
            TaskOutcome::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

/// A set of descriptors submitted in one summon call
///
/// Two wire forms are accepted:
/// - object form: `{"label": {"provider": "...", "parameters": {...}}, ...}`
/// - list form: `[{"label": "...", "provider": "...", "parameters": {...}}, ...]`
///
/// Both forms keep submission order, which is also launch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRequest {
    descriptors: Vec<TaskDescriptor>,
}

impl BatchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with(mut self, label: impl Into<String>, provider: impl Into<String>, parameters: Parameters) -> Self {
        self.descriptors.push(TaskDescriptor::new(label, provider, parameters));
        self
    }

    pub fn push(&mut self, descriptor: TaskDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> &[TaskDescriptor] {
        &self.descriptors
    }

    pub fn into_descriptors(self) -> Vec<TaskDescriptor> {
        self.descriptors
    }

    /// Parse either wire form from a JSON value
    pub fn from_value(value: Value) -> SharedResult<Self> {
        match value {
            Value::Object(entries) => {
                let mut batch = Self::new();
                for (label, spec) in entries {
                    let (provider, parameters) = Self::parse_spec(&label, spec)?;
                    batch.push(TaskDescriptor::new(label, provider, parameters));
                }
                Ok(batch)
            }
            Value::Array(items) => {
                let mut batch = Self::new();
                for (index, item) in items.into_iter().enumerate() {
                    let Value::Object(mut fields) = item else {
                        return Err(SharedError::MalformedBatch {
                            message: format!("entry {index} is not an object"),
                        });
                    };
                    let label = match fields.remove("label") {
                        Some(Value::String(label)) => label,
                        Some(other) => return Err(SharedError::NonStringLabel { found: other.to_string() }),
                        None => {
                            return Err(SharedError::MalformedBatch {
                                message: format!("entry {index} has no label"),
                            })
                        }
                    };
                    let (provider, parameters) = Self::parse_spec(&label, Value::Object(fields))?;
                    batch.push(TaskDescriptor::new(label, provider, parameters));
                }
                Ok(batch)
            }
            other => Err(SharedError::MalformedBatch {
                message: format!("expected an object or array, found {other}"),
            }),
        }
    }

    /// Parse either wire form from JSON text
    pub fn from_json(text: &str) -> SharedResult<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| SharedError::DeserializationError {
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    fn parse_spec(label: &str, spec: Value) -> SharedResult<(String, Parameters)> {
        let Value::Object(mut fields) = spec else {
            return Err(SharedError::MalformedBatch {
                message: format!("task '{label}' must be an object with provider and parameters"),
            });
        };

        let provider = match fields.remove("provider") {
            Some(Value::String(provider)) => provider,
            _ => {
                return Err(SharedError::MalformedBatch {
                    message: format!("task '{label}' is missing a string provider"),
                })
            }
        };

        let parameters = match fields.remove("parameters") {
            Some(Value::Object(parameters)) => parameters,
            None | Some(Value::Null) => Parameters::new(),
            Some(_) => {
                return Err(SharedError::MalformedBatch {
                    message: format!("task '{label}' parameters must be an object"),
                })
            }
        };

        Ok((provider, parameters))
    }
}

impl FromIterator<TaskDescriptor> for BatchRequest {
    fn from_iter<I: IntoIterator<Item = TaskDescriptor>>(iter: I) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}
