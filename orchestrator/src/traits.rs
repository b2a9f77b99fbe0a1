//! Trait definitions with mockall annotations for testing
//!
//! The orchestrator's only injected collaborator besides the network
//! transport is the source of provider credentials.

/// A named credential, e.g. `OPENAI_API_KEY`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Error when a required API key is missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredKeyMissing {
    pub key_name: String,
    pub message: String,
}

impl std::fmt::Display for RequiredKeyMissing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RequiredKeyMissing {}

/// API key source abstraction for dependency injection
///
/// Keys returned here are merged into the provider catalog before the
/// registry is built, so adapters never read the environment themselves.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ApiKeySource: Send + Sync {
    /// Retrieve all available API keys
    ///
    /// Fails with [`RequiredKeyMissing`] if a key the source was told to
    /// require is absent.
    async fn get_api_keys(&self) -> Result<Vec<KeyValuePair>, RequiredKeyMissing>;
}
