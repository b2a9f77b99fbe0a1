//! Execution behavior of run: concurrency, failure isolation, reuse

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use adapters::{
    constructor, Adapter, AdapterResult, Headers, HttpTransport, ParameterError, ProviderEntry, ProviderSettings,
    ValidatedAdapter,
};
use shared::{BatchRequest, ParamReader, Parameters, TaskOutcome};

mod common;
use common::{OrchestratorBuilder, TestFixtures, TestHelpers};

/// Test-only provider that sleeps then reports how long it slept
#[derive(Debug)]
struct SleepAdapter {
    millis: u64,
}

impl ValidatedAdapter for SleepAdapter {
    fn validate(parameters: &Parameters, _settings: &ProviderSettings) -> Result<Self, ParameterError> {
        let reader = ParamReader::new(parameters);
        Ok(Self {
            millis: reader.u64_in("millis", 0..=10_000, 0),
        })
    }
}

#[async_trait]
impl Adapter for SleepAdapter {
    fn provider(&self) -> &str {
        "sleep"
    }

    fn configure(&self) -> Headers {
        Vec::new()
    }

    async fn execute(&self, _transport: &dyn HttpTransport, _headers: Headers) -> AdapterResult<Value> {
        tokio::time::sleep(Duration::from_millis(self.millis)).await;
        Ok(json!({ "slept_ms": self.millis }))
    }
}

fn sleep_provider() -> ProviderEntry {
    ProviderEntry {
        key: "sleep",
        constructor: constructor::<SleepAdapter>(),
        defaults: ProviderSettings::new("local://sleep"),
        credential_vars: &[],
    }
}

#[tokio::test]
async fn test_echo_scenario() {
    let mut orchestrator = OrchestratorBuilder::new().build();
    orchestrator
        .summon_value(json!({"a": {"provider": "echo", "parameters": {"prompt": "hi"}}}))
        .unwrap();

    let results = orchestrator.run().await.unwrap();

    assert_eq!(results.get("a"), Some(&TaskOutcome::Completed(json!("hi"))));
}

#[tokio::test]
async fn test_result_keys_match_summoned_labels() {
    for size in [1usize, 7, 40] {
        let mut orchestrator = OrchestratorBuilder::new().with_capacity(40).build();
        let labels: Vec<String> = (0..size).map(|n| format!("task-{n}")).collect();
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        orchestrator.summon(TestFixtures::echo_batch(&label_refs)).unwrap();

        let (results, _) = TestHelpers::timed_run(&mut orchestrator).await;

        let mut expected = labels.clone();
        expected.sort();
        assert_eq!(TestHelpers::sorted_keys(&results), expected);
        assert!(results.values().all(TaskOutcome::is_completed));
    }
}

#[tokio::test]
async fn test_tasks_run_concurrently() {
    let mut orchestrator = OrchestratorBuilder::new().build();
    orchestrator.summon(TestFixtures::sleeping_batch("slow", 10, 300)).unwrap();

    let (results, elapsed) = TestHelpers::timed_run(&mut orchestrator).await;

    assert_eq!(results.len(), 10);
    assert!(elapsed >= Duration::from_millis(300));
    // Sequential execution would take 3s
    assert!(elapsed < Duration::from_millis(1500), "took {elapsed:?}");
}

#[tokio::test]
async fn test_slow_and_fast_tasks() {
    let mut orchestrator = OrchestratorBuilder::new().with_provider(sleep_provider()).build();
    let batch = BatchRequest::new()
        .with("a", "sleep", TestFixtures::params(json!({"millis": 2000})))
        .with("b", "sleep", TestFixtures::params(json!({"millis": 100})));
    orchestrator.summon(batch).unwrap();

    let (results, elapsed) = TestHelpers::timed_run(&mut orchestrator).await;

    assert!(elapsed >= Duration::from_millis(2000));
    assert!(elapsed < Duration::from_millis(3000), "took {elapsed:?}");
    assert_eq!(results["a"], TaskOutcome::Completed(json!({"slept_ms": 2000})));
    assert_eq!(results["b"], TaskOutcome::Completed(json!({"slept_ms": 100})));
}

#[tokio::test]
async fn test_stagger_delays_launches() {
    let mut orchestrator = OrchestratorBuilder::new()
        .with_stagger(Duration::from_millis(50))
        .build();
    orchestrator.summon(TestFixtures::echo_batch(&["a", "b", "c", "d"])).unwrap();

    let (results, elapsed) = TestHelpers::timed_run(&mut orchestrator).await;

    assert_eq!(results.len(), 4);
    // Three gaps between four launches
    assert!(elapsed >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_server_error_is_isolated_to_its_label() {
    let mut orchestrator = OrchestratorBuilder::new()
        .with_mock_transport(TestHelpers::fixed_transport(500, "internal error"))
        .with_api_key(TestFixtures::OPENAI, TestFixtures::TEST_KEY)
        .build();
    let batch = TestFixtures::echo_batch(&["left", "right"]).with(
        "broken",
        TestFixtures::OPENAI,
        TestFixtures::params(json!({"prompt": "hello"})),
    );
    orchestrator.summon(batch).unwrap();

    let results = orchestrator.run().await.unwrap();

    assert_eq!(results["broken"], TaskOutcome::Failed("500 - internal error".to_string()));
    assert_eq!(results["left"], TaskOutcome::Completed(json!("left")));
    assert_eq!(results["right"], TaskOutcome::Completed(json!("right")));
}

#[tokio::test]
async fn test_dismiss_then_reuse_matches_fresh_orchestrator() {
    let mut reused = OrchestratorBuilder::new().build();
    reused.summon(TestFixtures::echo_batch(&["old-1", "old-2"])).unwrap();
    reused.run().await.unwrap();
    reused.dismiss();

    let mut fresh = OrchestratorBuilder::new().build();

    for orchestrator in [&mut reused, &mut fresh] {
        orchestrator.summon(TestFixtures::echo_batch(&["new"])).unwrap();
        orchestrator.run().await.unwrap();
    }

    assert_eq!(reused.results(), fresh.results());
    assert_eq!(reused.labels(), vec!["new"]);
}

#[tokio::test]
async fn test_second_run_only_launches_pending_tasks() {
    let mut transport = adapters::MockHttpTransport::new();
    transport
        .expect_call()
        .times(1)
        .returning(|_| Ok(adapters::HttpResponse::json(200, &TestFixtures::chat_completion("once"))));

    let mut orchestrator = OrchestratorBuilder::new()
        .with_mock_transport(transport)
        .with_api_key(TestFixtures::OPENAI, TestFixtures::TEST_KEY)
        .build();
    orchestrator
        .summon(BatchRequest::new().with("chat", "openai", TestFixtures::params(json!({"prompt": "hi"}))))
        .unwrap();
    orchestrator.run().await.unwrap();

    orchestrator.summon(TestFixtures::echo_batch(&["late"])).unwrap();
    let results = orchestrator.run().await.unwrap();

    // The mock allows one call: the chat task was not executed twice
    assert_eq!(results.len(), 2);
    assert_eq!(results["chat"].value().unwrap()["text"], "once");
    assert_eq!(results["late"], TaskOutcome::Completed(json!("late")));
}

#[tokio::test]
async fn test_run_on_empty_batch() {
    let mut orchestrator = OrchestratorBuilder::new().build();
    assert!(orchestrator.run().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_results_json_is_tagged_by_status() {
    let mut orchestrator = OrchestratorBuilder::new()
        .with_mock_transport(TestHelpers::fixed_transport(503, "busy"))
        .with_api_key(TestFixtures::OPENAI, TestFixtures::TEST_KEY)
        .build();
    let batch = TestFixtures::echo_batch(&["ok"]).with(
        "down",
        TestFixtures::OPENAI,
        TestFixtures::params(json!({"prompt": "hello"})),
    );
    orchestrator.summon(batch).unwrap();
    orchestrator.run().await.unwrap();

    let rendered: Value = serde_json::from_str(&orchestrator.results_json().unwrap()).unwrap();

    assert_eq!(
        rendered,
        json!({
            "down": {"status": "failed", "value": "503 - busy"},
            "ok": {"status": "completed", "value": "ok"}
        })
    );
}
