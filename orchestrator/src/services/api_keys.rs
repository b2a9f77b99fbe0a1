//! Environment-backed API key source
//!
//! Keys are loaded from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! Environment variables take precedence over .env file values. No key is
//! required by default since the local `echo` provider needs none; callers
//! that only use a networked provider can mark its variable as required.

use tracing::{debug, info};

use crate::config::ProviderCatalog;
use crate::traits::{ApiKeySource, KeyValuePair, RequiredKeyMissing};

/// Real API key source using environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvApiKeySource {
    required: Vec<String>,
    optional: Vec<String>,
    load_dotenv: bool,
}

impl EnvApiKeySource {
    /// Look up every credential variable known to the catalog, all optional
    pub fn for_catalog(catalog: &ProviderCatalog) -> Self {
        Self {
            required: Vec::new(),
            optional: catalog.credential_vars().into_iter().map(str::to_string).collect(),
            load_dotenv: true,
        }
    }

    /// Fail key loading when `variable` is absent
    pub fn require(mut self, variable: impl Into<String>) -> Self {
        let variable = variable.into();
        self.optional.retain(|name| *name != variable);
        if !self.required.contains(&variable) {
            self.required.push(variable);
        }
        self
    }

    /// Skip `.env` loading and read the process environment only
    pub fn without_dotenv(mut self) -> Self {
        self.load_dotenv = false;
        self
    }

    fn init_env(&self) {
        if !self.load_dotenv {
            return;
        }
        // dotenvy never overrides variables that are already set
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => debug!(error = %e, "Ignoring unreadable .env file"),
        }
    }

    fn read(name: &str) -> Option<KeyValuePair> {
        std::env::var(name)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| KeyValuePair::new(name, value))
    }
}

#[async_trait::async_trait]
impl ApiKeySource for EnvApiKeySource {
    async fn get_api_keys(&self) -> Result<Vec<KeyValuePair>, RequiredKeyMissing> {
        self.init_env();

        let mut available_keys = Vec::new();
        let mut missing_required = Vec::new();

        for name in &self.required {
            match Self::read(name) {
                Some(pair) => available_keys.push(pair),
                None => missing_required.push(name.as_str()),
            }
        }

        if !missing_required.is_empty() {
            return Err(RequiredKeyMissing {
                key_name: missing_required.join(", "),
                message: format!(
                    "Missing required API keys: {}. These keys must be set as environment variables.",
                    missing_required.join(", ")
                ),
            });
        }

        available_keys.extend(self.optional.iter().filter_map(|name| Self::read(name)));

        let names: Vec<&str> = available_keys.iter().map(|kv| kv.key.as_str()).collect();
        info!(count = names.len(), keys = %names.join(", "), "🔑 API keys loaded");

        Ok(available_keys)
    }
}
