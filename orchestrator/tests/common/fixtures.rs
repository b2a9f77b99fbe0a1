//! Test fixtures and data for orchestrator tests

#![allow(dead_code)]

use serde_json::{json, Value};
use shared::{BatchRequest, Parameters};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const ECHO: &'static str = "echo";
    pub const OPENAI: &'static str = "openai";
    pub const TEST_KEY: &'static str = "sk-test";

    /// Object form of a JSON value, panicking on anything else
    pub fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object parameters, got {other}"),
        }
    }

    /// Echo task parameters with an optional simulated latency
    pub fn echo_params(prompt: &str, delay_ms: u64) -> Parameters {
        Self::params(json!({"prompt": prompt, "delay_ms": delay_ms}))
    }

    /// One echo task per label, each echoing its own label
    pub fn echo_batch(labels: &[&str]) -> BatchRequest {
        labels
            .iter()
            .fold(BatchRequest::new(), |batch, label| batch.with(*label, Self::ECHO, Self::echo_params(label, 0)))
    }

    /// `count` echo tasks labelled `{prefix}-{n}`, each sleeping `delay_ms`
    pub fn sleeping_batch(prefix: &str, count: usize, delay_ms: u64) -> BatchRequest {
        (0..count).fold(BatchRequest::new(), |batch, n| {
            batch.with(format!("{prefix}-{n}"), Self::ECHO, Self::echo_params("zz", delay_ms))
        })
    }

    /// OpenAI chat completion body as the API returns it
    pub fn chat_completion(text: &str) -> Value {
        json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        })
    }
}
