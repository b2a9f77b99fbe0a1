//! OpenAI chat completions (text)

use async_trait::async_trait;
use serde_json::{json, Value};

use shared::{ParamReader, ParameterError, Parameters};

use super::{base_url, bearer, credential, json_content_type, model};
use crate::error::{AdapterResult, TaskFailure};
use crate::traits::{Adapter, HttpTransport, ValidatedAdapter};
use crate::types::{classify, Headers, HttpRequest, ProviderSettings};

pub const PROVIDER: &str = "openai";

pub fn default_settings() -> ProviderSettings {
    ProviderSettings::new("https://api.openai.com/v1")
        .with_model("gpt-4o-mini")
        .with_max_tokens(1024)
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiChatAdapter {
    base_url: String,
    api_key: String,
    model: String,
    prompt: String,
    system: Option<String>,
    max_tokens: u32,
    temperature: f64,
}

impl ValidatedAdapter for OpenAiChatAdapter {
    fn validate(parameters: &Parameters, settings: &ProviderSettings) -> Result<Self, ParameterError> {
        let reader = ParamReader::new(parameters);
        Ok(Self {
            prompt: reader.required_str("prompt")?,
            api_key: credential(&reader, settings)?,
            model: model(&reader, settings)?,
            base_url: base_url(&reader, settings),
            system: reader.optional_str("system"),
            max_tokens: reader.u32_in("max_tokens", 1..=16_384, settings.max_tokens),
            temperature: reader.f64_in("temperature", 0.0..=2.0, 0.7),
        })
    }
}

impl OpenAiChatAdapter {
    fn request_body(&self) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = &self.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": self.prompt}));

        json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        })
    }
}

#[async_trait]
impl Adapter for OpenAiChatAdapter {
    fn provider(&self) -> &str {
        PROVIDER
    }

    fn configure(&self) -> Headers {
        vec![bearer(&self.api_key), json_content_type()]
    }

    async fn execute(&self, transport: &dyn HttpTransport, headers: Headers) -> AdapterResult<Value> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = classify(transport.call(HttpRequest::post_json(url, headers, self.request_body())).await?)?;
        let body = response.parse_json()?;

        let text = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| TaskFailure::unexpected("No content in response"))?;

        Ok(json!({
            "text": text,
            "model": body.get("model").cloned().unwrap_or_else(|| json!(self.model)),
            "usage": body.get("usage").cloned().unwrap_or(Value::Null),
        }))
    }
}
