//! Orchestrator and provider configuration
//!
//! Nothing here is global: an [`OrchestratorConfig`] and a [`ProviderCatalog`]
//! are built by the caller and handed to the orchestrator and registry.

use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use adapters::{builtin, ProviderEntry, ProviderSettings};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::KeyValuePair;

pub const DEFAULT_CAPACITY: usize = 150;
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(100);

pub const CAPACITY_ENV: &str = "SUMMON_CAPACITY";
pub const STAGGER_ENV: &str = "SUMMON_STAGGER_MS";

/// Batch limits and launch pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Maximum number of tasks the batch may hold across summon calls
    pub capacity: usize,
    /// Delay between starting consecutive tasks in `run()`
    pub stagger: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            stagger: DEFAULT_STAGGER,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Defaults overridden by `SUMMON_CAPACITY` and `SUMMON_STAGGER_MS`
    pub fn from_env() -> OrchestratorResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable lookup
    pub fn from_lookup<F>(lookup: F) -> OrchestratorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(CAPACITY_ENV) {
            config.capacity = parse_number(CAPACITY_ENV, &raw)? as usize;
        }
        if let Some(raw) = lookup(STAGGER_ENV) {
            config.stagger = Duration::from_millis(parse_number(STAGGER_ENV, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.capacity == 0 {
            return Err(OrchestratorError::config("capacity", "must be at least 1"));
        }
        Ok(())
    }
}

fn parse_number(field: &str, raw: &str) -> OrchestratorResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| OrchestratorError::config(field, format!("'{raw}' is not a non-negative integer: {e}")))
}

/// Provider key to constructor and default settings
///
/// Replaces module-level default tables: the registry only knows the
/// providers present in the catalog it was given.
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    entries: HashMap<String, ProviderEntry>,
}

impl ProviderCatalog {
    /// Empty catalog, for tests and embedders that register their own adapters
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every provider shipped in the adapters crate
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for entry in builtin() {
            catalog.register(entry);
        }
        catalog
    }

    /// Add or replace a provider
    pub fn register(&mut self, entry: ProviderEntry) -> &mut Self {
        self.entries.insert(entry.key.to_string(), entry);
        self
    }

    pub fn get(&self, provider: &str) -> Option<&ProviderEntry> {
        self.entries.get(provider)
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.entries.contains_key(provider)
    }

    /// Provider keys, sorted
    pub fn providers(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mutable access to one provider's defaults
    pub fn settings_mut(&mut self, provider: &str) -> Option<&mut ProviderSettings> {
        self.entries.get_mut(provider).map(|entry| &mut entry.defaults)
    }

    /// Every credential variable any provider can use, deduplicated
    pub fn credential_vars(&self) -> Vec<&'static str> {
        let mut vars: Vec<&'static str> = self
            .entries
            .values()
            .flat_map(|entry| entry.credential_vars.iter().copied())
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// Fill each provider's credential from the first matching key
    ///
    /// Providers keep an existing credential if none of their variables is
    /// present. Returns how many providers received a key.
    pub fn apply_api_keys(&mut self, keys: &[KeyValuePair]) -> usize {
        let mut applied = 0;
        for entry in self.entries.values_mut() {
            let found = entry
                .credential_vars
                .iter()
                .find_map(|var| keys.iter().find(|kv| kv.key == *var && !kv.value.trim().is_empty()));
            if let Some(kv) = found {
                debug!(provider = entry.key, variable = %kv.key, "🔑 Credential applied");
                entry.defaults.api_key = Some(kv.value.clone());
                applied += 1;
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.capacity, 150);
        assert_eq!(config.stagger, Duration::from_millis(100));
    }

    #[test]
    fn test_lookup_overrides() {
        let config = OrchestratorConfig::from_lookup(|name| match name {
            CAPACITY_ENV => Some("12".to_string()),
            STAGGER_ENV => Some(" 0 ".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.capacity, 12);
        assert_eq!(config.stagger, Duration::ZERO);
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        let result = OrchestratorConfig::from_lookup(|name| (name == STAGGER_ENV).then(|| "soon".to_string()));
        assert!(matches!(result, Err(OrchestratorError::Config { field, .. }) if field == STAGGER_ENV));

        let result = OrchestratorConfig::from_lookup(|name| (name == CAPACITY_ENV).then(|| "0".to_string()));
        assert!(matches!(result, Err(OrchestratorError::Config { field, .. }) if field == "capacity"));
    }

    #[test]
    fn test_api_keys_follow_preference_order() {
        let mut catalog = ProviderCatalog::builtin();
        let applied = catalog.apply_api_keys(&[
            KeyValuePair::new("GOOGLE_AI_API_KEY", "second"),
            KeyValuePair::new("GOOGLE_API_KEY", "first"),
            KeyValuePair::new("OPENAI_API_KEY", "sk-1"),
            KeyValuePair::new("ANTHROPIC_API_KEY", "  "),
        ]);

        // openai and openai-image share a variable
        assert_eq!(applied, 3);
        assert_eq!(catalog.get("gemini").unwrap().defaults.api_key.as_deref(), Some("first"));
        assert_eq!(catalog.get("openai-image").unwrap().defaults.api_key.as_deref(), Some("sk-1"));
        assert_eq!(catalog.get("anthropic").unwrap().defaults.api_key, None);
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = ProviderCatalog::builtin();
        assert!(catalog.contains("echo"));
        assert!(catalog.contains("stability-video"));
        assert!(!catalog.contains("unknown"));
        assert!(catalog.credential_vars().contains(&"REPLICATE_API_TOKEN"));
        assert_eq!(catalog.providers().first(), Some(&"anthropic"));
    }
}
