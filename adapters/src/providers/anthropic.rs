//! Anthropic messages API (text)

use async_trait::async_trait;
use serde_json::{json, Value};

use shared::{ParamReader, ParameterError, Parameters};

use super::{base_url, credential, json_content_type, model};
use crate::error::{AdapterResult, TaskFailure};
use crate::traits::{Adapter, HttpTransport, ValidatedAdapter};
use crate::types::{classify, Headers, HttpRequest, ProviderSettings};

pub const PROVIDER: &str = "anthropic";

const API_VERSION: &str = "2023-06-01";

pub fn default_settings() -> ProviderSettings {
    ProviderSettings::new("https://api.anthropic.com/v1")
        .with_model("claude-3-5-haiku-latest")
        .with_max_tokens(1024)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicAdapter {
    base_url: String,
    api_key: String,
    model: String,
    prompt: String,
    system: Option<String>,
    max_tokens: u32,
    temperature: f64,
}

impl ValidatedAdapter for AnthropicAdapter {
    fn validate(parameters: &Parameters, settings: &ProviderSettings) -> Result<Self, ParameterError> {
        let reader = ParamReader::new(parameters);
        Ok(Self {
            prompt: reader.required_str("prompt")?,
            api_key: credential(&reader, settings)?,
            model: model(&reader, settings)?,
            base_url: base_url(&reader, settings),
            system: reader.optional_str("system"),
            max_tokens: reader.u32_in("max_tokens", 1..=8_192, settings.max_tokens),
            temperature: reader.f64_in("temperature", 0.0..=1.0, 0.7),
        })
    }
}

#[async_trait]
impl Adapter for AnthropicAdapter {
    fn provider(&self) -> &str {
        PROVIDER
    }

    fn configure(&self) -> Headers {
        vec![
            ("x-api-key".to_string(), self.api_key.clone()),
            ("anthropic-version".to_string(), API_VERSION.to_string()),
            json_content_type(),
        ]
    }

    async fn execute(&self, transport: &dyn HttpTransport, headers: Headers) -> AdapterResult<Value> {
        let mut body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [{"role": "user", "content": self.prompt}],
        });
        if let Some(system) = &self.system {
            body["system"] = json!(system);
        }

        let url = format!("{}/messages", self.base_url);
        let response = classify(transport.call(HttpRequest::post_json(url, headers, body)).await?)?;
        let body = response.parse_json()?;

        let text = body
            .get("content")
            .and_then(|content| content.get(0))
            .and_then(|item| item.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| TaskFailure::unexpected("No content in response"))?;

        Ok(json!({
            "text": text,
            "model": body.get("model").cloned().unwrap_or_else(|| json!(self.model)),
            "usage": body.get("usage").cloned().unwrap_or(Value::Null),
        }))
    }
}
