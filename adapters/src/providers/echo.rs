//! Local echo provider
//!
//! Makes no network call. Returns the prompt repeated `repeat` times, joined
//! by a single space, after an optional simulated latency. Useful for smoke
//! runs and for exercising the orchestrator without credentials.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use shared::{ParamReader, ParameterError, Parameters};

use crate::error::AdapterResult;
use crate::traits::{Adapter, HttpTransport, ValidatedAdapter};
use crate::types::{Headers, ProviderSettings};

pub const PROVIDER: &str = "echo";

const MAX_REPEAT: u32 = 10;
const MAX_DELAY_MS: u64 = 60_000;

pub fn default_settings() -> ProviderSettings {
    ProviderSettings::new("local://echo")
}

#[derive(Debug, Clone, PartialEq)]
pub struct EchoAdapter {
    prompt: String,
    repeat: u32,
    delay: Duration,
}

impl EchoAdapter {
    /// The deterministic transform applied to the prompt
    pub fn transform(prompt: &str, repeat: u32) -> String {
        vec![prompt; repeat.max(1) as usize].join(" ")
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl ValidatedAdapter for EchoAdapter {
    fn validate(parameters: &Parameters, _settings: &ProviderSettings) -> Result<Self, ParameterError> {
        let reader = ParamReader::new(parameters);
        Ok(Self {
            prompt: reader.required_str("prompt")?,
            repeat: reader.u32_in("repeat", 1..=MAX_REPEAT, 1),
            delay: Duration::from_millis(reader.u64_in("delay_ms", 0..=MAX_DELAY_MS, 0)),
        })
    }
}

#[async_trait]
impl Adapter for EchoAdapter {
    fn provider(&self) -> &str {
        PROVIDER
    }

    fn configure(&self) -> Headers {
        Vec::new()
    }

    async fn execute(&self, _transport: &dyn HttpTransport, _headers: Headers) -> AdapterResult<Value> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Value::String(Self::transform(&self.prompt, self.repeat)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::params;
    use crate::traits::MockHttpTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_echo_returns_prompt() {
        let adapter = EchoAdapter::validate(&params(json!({"prompt": "hi"})), &default_settings()).unwrap();
        let value = adapter.execute(&MockHttpTransport::new(), adapter.configure()).await.unwrap();

        assert_eq!(value, json!("hi"));
    }

    #[tokio::test]
    async fn test_echo_repeats() {
        let adapter =
            EchoAdapter::validate(&params(json!({"prompt": "hi", "repeat": 3})), &default_settings()).unwrap();
        let value = adapter.execute(&MockHttpTransport::new(), Vec::new()).await.unwrap();

        assert_eq!(value, json!("hi hi hi"));
    }

    #[test]
    fn test_invalid_optionals_fall_back() {
        let adapter = EchoAdapter::validate(
            &params(json!({"prompt": "hi", "repeat": 500, "delay_ms": "soon"})),
            &default_settings(),
        )
        .unwrap();

        assert_eq!(adapter.repeat, 1);
        assert_eq!(adapter.delay(), Duration::ZERO);
    }

    #[test]
    fn test_missing_prompt_is_rejected() {
        let result = EchoAdapter::validate(&params(json!({"repeat": 2})), &default_settings());
        assert_eq!(result, Err(ParameterError::Missing { field: "prompt".into() }));
    }
}
