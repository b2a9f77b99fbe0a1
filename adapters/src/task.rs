//! Task lifecycle wrapper around a validated adapter

use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use shared::{task_debug, task_info, task_warn, TaskOutcome};

use crate::traits::{Adapter, HttpTransport};

/// One labelled adapter plus its result slot
///
/// Created validated but not started. [`launch`](AdapterTask::launch) yields
/// a self-contained future that runs configure then execute and always
/// resolves to an outcome; [`store`](AdapterTask::store) writes that outcome
/// once, after which the task is terminal.
pub struct AdapterTask {
    label: String,
    adapter: Arc<dyn Adapter>,
    transport: Arc<dyn HttpTransport>,
    result: Option<TaskOutcome>,
}

impl AdapterTask {
    pub fn new(label: impl Into<String>, adapter: Box<dyn Adapter>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            label: label.into(),
            adapter: Arc::from(adapter),
            transport,
            result: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn provider(&self) -> &str {
        self.adapter.provider()
    }

    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter.as_ref()
    }

    /// Stored outcome; `None` until the task is terminal
    pub fn result(&self) -> Option<&TaskOutcome> {
        self.result.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.result.is_some()
    }

    /// Detached future for one run of this task
    ///
    /// Never fails: execution errors and adapter panics both come back as
    /// [`TaskOutcome::Failed`].
    pub fn launch(&self) -> impl Future<Output = TaskOutcome> + Send + 'static {
        let label = self.label.clone();
        let adapter = Arc::clone(&self.adapter);
        let transport = Arc::clone(&self.transport);

        async move {
            task_debug!(label, "▶️ Launching {} task", adapter.provider());

            let run = async {
                let headers = adapter.configure();
                adapter.execute(transport.as_ref(), headers).await
            };

            match AssertUnwindSafe(run).catch_unwind().await {
                Ok(Ok(value)) => {
                    task_info!(label, "✅ {} task completed", adapter.provider());
                    TaskOutcome::Completed(value)
                }
                Ok(Err(failure)) => {
                    task_warn!(label, "⚠️ {} task failed: {}", adapter.provider(), failure);
                    TaskOutcome::Failed(failure.to_string())
                }
                Err(panic) => {
                    let message = format!("adapter panicked: {}", panic_message(panic.as_ref()));
                    task_warn!(label, "💥 {} task {}", adapter.provider(), message);
                    TaskOutcome::Failed(message)
                }
            }
        }
    }

    /// Write the outcome; only the first write sticks
    ///
    /// Returns `false` when the task was already terminal.
    pub fn store(&mut self, outcome: TaskOutcome) -> bool {
        if self.result.is_some() {
            task_warn!(self.label, "Ignoring second result for a terminal task");
            return false;
        }
        self.result = Some(outcome);
        true
    }

    /// Launch and store in place, for callers that run a single task
    pub async fn run(&mut self) -> Option<&TaskOutcome> {
        if self.result.is_none() {
            let outcome = self.launch().await;
            self.store(outcome);
        }
        self.result.as_ref()
    }
}

impl std::fmt::Debug for AdapterTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterTask")
            .field("label", &self.label)
            .field("adapter", &self.adapter)
            .field("result", &self.result)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdapterResult, TaskFailure};
    use crate::traits::MockHttpTransport;
    use crate::types::{Headers, HttpRequest, HttpResponse};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    #[derive(Debug)]
    struct PingAdapter;

    #[async_trait]
    impl Adapter for PingAdapter {
        fn provider(&self) -> &str {
            "ping"
        }

        fn configure(&self) -> Headers {
            vec![("X-Ping".to_string(), "1".to_string())]
        }

        async fn execute(&self, transport: &dyn HttpTransport, headers: Headers) -> AdapterResult<Value> {
            let response = crate::types::classify(transport.call(HttpRequest::get("http://ping", headers)).await?)?;
            response.parse_json()
        }
    }

    #[derive(Debug)]
    struct PanickingAdapter;

    #[async_trait]
    impl Adapter for PanickingAdapter {
        fn provider(&self) -> &str {
            "panic"
        }

        fn configure(&self) -> Headers {
            Vec::new()
        }

        async fn execute(&self, _transport: &dyn HttpTransport, _headers: Headers) -> AdapterResult<Value> {
            panic!("adapter exploded");
        }
    }

    #[tokio::test]
    async fn test_run_passes_configured_headers_and_stores_result() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_call()
            .withf(|request| request.headers.iter().any(|(name, value)| name == "X-Ping" && value == "1"))
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({"pong": true}))));

        let mut task = AdapterTask::new("p", Box::new(PingAdapter), Arc::new(transport));
        assert!(!task.is_terminal());

        let outcome = task.run().await.cloned();
        assert_eq!(outcome, Some(TaskOutcome::Completed(json!({"pong": true}))));
        assert!(task.is_terminal());
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_failed_outcome() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_call()
            .returning(|_| Ok(HttpResponse::new(500, "server on fire")));

        let task = AdapterTask::new("p", Box::new(PingAdapter), Arc::new(transport));
        let outcome = task.launch().await;

        assert_eq!(outcome, TaskOutcome::Failed("500 - server on fire".to_string()));
    }

    #[tokio::test]
    async fn test_network_error_becomes_failed_outcome() {
        let mut transport = MockHttpTransport::new();
        transport.expect_call().returning(|_| {
            Err(TaskFailure::Network {
                message: "dns failure".into(),
            })
        });

        let task = AdapterTask::new("p", Box::new(PingAdapter), Arc::new(transport));
        let outcome = task.launch().await;

        assert_eq!(outcome.failure(), Some("Network error: dns failure"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let task = AdapterTask::new("boom", Box::new(PanickingAdapter), Arc::new(MockHttpTransport::new()));
        let outcome = task.launch().await;

        assert_eq!(outcome.failure(), Some("adapter panicked: adapter exploded"));
    }

    #[tokio::test]
    async fn test_store_only_accepts_first_outcome() {
        let mut task = AdapterTask::new("p", Box::new(PingAdapter), Arc::new(MockHttpTransport::new()));

        assert!(task.store(TaskOutcome::Completed(json!(1))));
        assert!(!task.store(TaskOutcome::Failed("late".into())));
        assert_eq!(task.result(), Some(&TaskOutcome::Completed(json!(1))));
    }
}
