//! Batch orchestrator
//!
//! Owns one batch of labelled tasks. `summon` grows the batch, `run` executes
//! every pending task concurrently behind a single join barrier, `dismiss`
//! returns to the empty state.

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

use adapters::{AdapterTask, HttpTransport, RealHttpTransport};
use shared::{task_debug, BatchRequest, TaskOutcome};

use crate::config::{OrchestratorConfig, ProviderCatalog};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::registry::AdapterRegistry;
use crate::traits::ApiKeySource;

/// Label to terminal outcome, filled after the join
pub type ResultMap = BTreeMap<String, TaskOutcome>;

#[derive(Debug)]
pub struct Orchestrator {
    config: OrchestratorConfig,
    registry: AdapterRegistry,
    /// Insertion order is launch order
    tasks: Vec<AdapterTask>,
    results: ResultMap,
}

impl Orchestrator {
    pub fn new(registry: AdapterRegistry, config: OrchestratorConfig) -> Self {
        Self {
            config,
            registry,
            tasks: Vec::new(),
            results: ResultMap::new(),
        }
    }

    /// Builtin providers with credentials from `keys`, over real HTTP
    pub async fn with_api_keys<K>(config: OrchestratorConfig, keys: &K) -> OrchestratorResult<Self>
    where
        K: ApiKeySource + ?Sized,
    {
        let mut catalog = ProviderCatalog::builtin();
        let keys = keys
            .get_api_keys()
            .await
            .map_err(|e| OrchestratorError::config(e.key_name.clone(), e.message))?;
        catalog.apply_api_keys(&keys);

        let transport: Arc<dyn HttpTransport> = Arc::new(RealHttpTransport::new());
        Ok(Self::new(AdapterRegistry::new(catalog, transport), config))
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AdapterRegistry {
        &mut self.registry
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Labels in launch order
    pub fn labels(&self) -> Vec<&str> {
        self.tasks.iter().map(AdapterTask::label).collect()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.tasks.iter().any(|task| task.label() == label)
    }

    /// Result map from the last `run`; empty before the first one
    pub fn results(&self) -> &ResultMap {
        &self.results
    }

    pub fn result(&self, label: &str) -> Option<&TaskOutcome> {
        self.results.get(label)
    }

    /// Validate and add descriptors to the batch
    ///
    /// All-or-nothing: every descriptor is checked and validated before any
    /// is inserted, so a failing call leaves the batch as it was. Returns the
    /// labels added, in order.
    pub fn summon(&mut self, batch: BatchRequest) -> OrchestratorResult<Vec<String>> {
        let capacity = self.config.capacity;
        let size = batch.len();
        if size == 0 || size > capacity {
            return Err(OrchestratorError::InvalidBatchSize { size, capacity });
        }

        let descriptors = batch.into_descriptors();

        let mut seen = HashSet::with_capacity(size);
        for descriptor in &descriptors {
            let label = descriptor.label();
            if self.contains(label) || !seen.insert(label) {
                return Err(OrchestratorError::DuplicateLabel {
                    label: label.to_string(),
                });
            }
        }

        if self.tasks.len() + size > capacity {
            return Err(OrchestratorError::CapacityExceeded {
                current: self.tasks.len(),
                requested: size,
                capacity,
            });
        }

        for (index, descriptor) in descriptors.iter().enumerate() {
            let validated = self
                .registry
                .validate(descriptor.label(), descriptor.provider(), descriptor.parameters());
            if let Err(e) = validated {
                for earlier in &descriptors[..index] {
                    self.registry.discard(earlier.label());
                }
                debug!(error = %e, "Summon rejected");
                return Err(e);
            }
        }

        let mut created = Vec::with_capacity(size);
        for descriptor in &descriptors {
            created.push(self.registry.create(descriptor.label())?);
        }

        let labels: Vec<String> = created.iter().map(|task| task.label().to_string()).collect();
        for task in &created {
            task_debug!(task.label(), "📥 Summoned {} task", task.provider());
        }
        self.tasks.extend(created);

        info!(added = size, total = self.tasks.len(), capacity, "📦 Batch summoned");
        Ok(labels)
    }

    /// Parse either batch wire form, then [`summon`](Self::summon)
    pub fn summon_value(&mut self, value: Value) -> OrchestratorResult<Vec<String>> {
        self.summon(BatchRequest::from_value(value)?)
    }

    pub fn summon_json(&mut self, text: &str) -> OrchestratorResult<Vec<String>> {
        self.summon(BatchRequest::from_json(text)?)
    }

    /// Read a batch file in either wire form, then [`summon`](Self::summon)
    pub fn summon_file(&mut self, path: impl AsRef<Path>) -> OrchestratorResult<Vec<String>> {
        let text = std::fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), bytes = text.len(), "📄 Batch file read");
        self.summon_json(&text)
    }

    /// Result map from the last `run` as pretty-printed JSON
    pub fn results_json(&self) -> OrchestratorResult<String> {
        Ok(serde_json::to_string_pretty(&self.results)?)
    }

    /// Execute every pending task and rebuild the result map
    ///
    /// Tasks start in insertion order, one stagger delay apart, and run
    /// concurrently. Returns once every task is terminal. Task failures are
    /// outcomes, not errors; only a task that cannot be joined fails the run.
    /// Tasks already terminal from an earlier run keep their outcome.
    pub async fn run(&mut self) -> OrchestratorResult<&ResultMap> {
        self.results.clear();

        let pending: Vec<usize> = (0..self.tasks.len())
            .filter(|&index| !self.tasks[index].is_terminal())
            .collect();
        info!(
            pending = pending.len(),
            total = self.tasks.len(),
            stagger_ms = self.config.stagger.as_millis() as u64,
            "🏁 Running batch"
        );

        let mut join_set = JoinSet::new();
        for (position, &index) in pending.iter().enumerate() {
            if position > 0 && !self.config.stagger.is_zero() {
                tokio::time::sleep(self.config.stagger).await;
            }
            let launch = self.tasks[index].launch();
            join_set.spawn(async move { (index, launch.await) });
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(joined) = join_set.join_next().await {
            let (index, outcome) = joined.map_err(|e| OrchestratorError::TaskJoin { message: e.to_string() })?;
            outcomes.push((index, outcome));
        }

        // Join barrier passed: nothing else touches the tasks now
        for (index, outcome) in outcomes {
            self.tasks[index].store(outcome);
        }

        self.results = self
            .tasks
            .iter()
            .filter_map(|task| task.result().map(|outcome| (task.label().to_string(), outcome.clone())))
            .collect();

        let failed = self.results.values().filter(|outcome| outcome.is_failed()).count();
        info!(completed = self.results.len() - failed, failed, "✅ Batch finished");
        Ok(&self.results)
    }

    /// Clear the batch and the result map
    pub fn dismiss(&mut self) {
        let dropped = self.tasks.len();
        self.tasks.clear();
        self.results.clear();
        info!(dropped, "🧹 Batch dismissed");
    }
}
