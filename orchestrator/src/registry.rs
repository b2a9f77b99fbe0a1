//! Adapter registry and factory
//!
//! Validation and construction are separate steps: [`AdapterRegistry::validate`]
//! checks a descriptor and parks the validated adapter under its label, and
//! only [`AdapterRegistry::create`] turns it into a runnable task bound to
//! the network transport. A rejected batch therefore never produces a task.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use adapters::{Adapter, AdapterTask, HttpTransport, ProviderEntry};
use shared::Parameters;

use crate::config::ProviderCatalog;
use crate::error::{OrchestratorError, OrchestratorResult};

pub struct AdapterRegistry {
    catalog: ProviderCatalog,
    transport: Arc<dyn HttpTransport>,
    verified: HashMap<String, Box<dyn Adapter>>,
}

impl AdapterRegistry {
    pub fn new(catalog: ProviderCatalog, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            catalog,
            transport,
            verified: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Add or replace a provider after construction
    pub fn register(&mut self, entry: ProviderEntry) {
        self.catalog.register(entry);
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.catalog.contains(provider)
    }

    /// Check label, provider and parameters, keeping the validated adapter
    ///
    /// Revalidating a label replaces whatever was parked under it.
    pub fn validate(&mut self, label: &str, provider: &str, parameters: &Parameters) -> OrchestratorResult<()> {
        validate_label(label)?;

        let entry = self
            .catalog
            .get(provider)
            .ok_or_else(|| OrchestratorError::UnknownProvider {
                label: label.to_string(),
                provider: provider.to_string(),
            })?;

        let adapter = (entry.constructor)(parameters, &entry.defaults)
            .map_err(|e| OrchestratorError::from_parameter(label, e))?;

        debug!(task = %label, provider, "✔️ Descriptor validated");
        self.verified.insert(label.to_string(), adapter);
        Ok(())
    }

    /// Build the runnable task for a label that passed validation
    ///
    /// Consumes the validation: a second `create` for the same label fails
    /// with [`OrchestratorError::NotVerified`] until it is validated again.
    pub fn create(&mut self, label: &str) -> OrchestratorResult<AdapterTask> {
        let adapter = self.verified.remove(label).ok_or_else(|| OrchestratorError::NotVerified {
            label: label.to_string(),
        })?;
        Ok(AdapterTask::new(label, adapter, Arc::clone(&self.transport)))
    }

    /// Drop a validated adapter without constructing it
    pub fn discard(&mut self, label: &str) -> bool {
        self.verified.remove(label).is_some()
    }

    pub fn is_verified(&self, label: &str) -> bool {
        self.verified.contains_key(label)
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("providers", &self.catalog.providers())
            .field("verified", &self.verified.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn validate_label(label: &str) -> OrchestratorResult<()> {
    if label.trim().is_empty() {
        return Err(OrchestratorError::InvalidLabel {
            reason: "label must not be empty".to_string(),
        });
    }
    Ok(())
}
