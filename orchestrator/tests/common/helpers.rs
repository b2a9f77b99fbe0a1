//! Test helpers and builder patterns for orchestrator tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use adapters::{HttpResponse, HttpTransport, MockHttpTransport, ProviderEntry};
use orchestrator::{AdapterRegistry, Orchestrator, OrchestratorConfig, ProviderCatalog, ResultMap};

/// Builder for test orchestrators with sensible defaults
///
/// Defaults: builtin providers, no stagger, capacity 150 and a mock
/// transport that must not be called.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    catalog: ProviderCatalog,
    transport: Arc<dyn HttpTransport>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            config: OrchestratorConfig::default().with_stagger(Duration::ZERO),
            catalog: ProviderCatalog::builtin(),
            transport: Arc::new(MockHttpTransport::new()),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_capacity(capacity);
        self
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.config = self.config.with_stagger(stagger);
        self
    }

    pub fn with_mock_transport(mut self, transport: MockHttpTransport) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_provider(mut self, entry: ProviderEntry) -> Self {
        self.catalog.register(entry);
        self
    }

    /// Give a provider a catalog credential
    pub fn with_api_key(mut self, provider: &str, key: &str) -> Self {
        if let Some(settings) = self.catalog.settings_mut(provider) {
            settings.api_key = Some(key.to_string());
        }
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator::new(AdapterRegistry::new(self.catalog, self.transport), self.config)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestHelpers;

impl TestHelpers {
    /// Transport that answers every call with the same status and body
    pub fn fixed_transport(status: u16, body: &'static str) -> MockHttpTransport {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_call()
            .returning(move |_| Ok(HttpResponse::new(status, body)));
        transport
    }

    /// Run the batch and return its results with the wall-clock time taken
    pub async fn timed_run(orchestrator: &mut Orchestrator) -> (ResultMap, Duration) {
        let started = Instant::now();
        let results = orchestrator.run().await.expect("run should not fail").clone();
        (results, started.elapsed())
    }

    pub fn sorted_keys(results: &ResultMap) -> Vec<String> {
        results.keys().cloned().collect()
    }
}
