//! Service implementations
//!
//! Production implementations of the orchestrator's injected traits.

pub mod api_keys;

#[cfg(test)]
pub mod tests;

pub use api_keys::EnvApiKeySource;
