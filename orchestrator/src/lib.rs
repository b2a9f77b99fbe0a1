//! Orchestrator library for running batches of generation tasks
//!
//! Callers summon labelled task descriptors, run them concurrently against
//! their providers and read one outcome per label. Provider specifics live in
//! the `adapters` crate; this crate owns batching, validation order,
//! concurrency and configuration.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{OrchestratorConfig, ProviderCatalog};
pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::{Orchestrator, ResultMap};
pub use registry::AdapterRegistry;
pub use services::EnvApiKeySource;
pub use traits::{ApiKeySource, KeyValuePair, MockApiKeySource, RequiredKeyMissing};
