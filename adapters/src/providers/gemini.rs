//! Google Gemini generateContent (text)

use async_trait::async_trait;
use serde_json::{json, Value};

use shared::{ParamReader, ParameterError, Parameters};

use super::{base_url, credential, json_content_type, model};
use crate::error::{AdapterResult, TaskFailure};
use crate::traits::{Adapter, HttpTransport, ValidatedAdapter};
use crate::types::{classify, Headers, HttpRequest, ProviderSettings};

pub const PROVIDER: &str = "gemini";

pub fn default_settings() -> ProviderSettings {
    ProviderSettings::new("https://generativelanguage.googleapis.com/v1beta")
        .with_model("gemini-1.5-flash")
        .with_max_tokens(1024)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiAdapter {
    base_url: String,
    api_key: String,
    model: String,
    prompt: String,
    max_tokens: u32,
    temperature: f64,
}

impl ValidatedAdapter for GeminiAdapter {
    fn validate(parameters: &Parameters, settings: &ProviderSettings) -> Result<Self, ParameterError> {
        let reader = ParamReader::new(parameters);
        Ok(Self {
            prompt: reader.required_str("prompt")?,
            api_key: credential(&reader, settings)?,
            model: model(&reader, settings)?,
            base_url: base_url(&reader, settings),
            max_tokens: reader.u32_in("max_tokens", 1..=8_192, settings.max_tokens),
            temperature: reader.f64_in("temperature", 0.0..=2.0, 0.7),
        })
    }
}

#[async_trait]
impl Adapter for GeminiAdapter {
    fn provider(&self) -> &str {
        PROVIDER
    }

    fn configure(&self) -> Headers {
        vec![("x-goog-api-key".to_string(), self.api_key.clone()), json_content_type()]
    }

    async fn execute(&self, transport: &dyn HttpTransport, headers: Headers) -> AdapterResult<Value> {
        let body = json!({
            "contents": [{"parts": [{"text": self.prompt}]}],
            "generationConfig": {
                "maxOutputTokens": self.max_tokens,
                "temperature": self.temperature,
            }
        });

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = classify(transport.call(HttpRequest::post_json(url, headers, body)).await?)?;
        let body = response.parse_json()?;

        let text = body
            .get("candidates")
            .and_then(|candidates| candidates.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.get(0))
            .and_then(|part| part.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| TaskFailure::unexpected("No content in response"))?;

        // Gemini doesn't always report token counts
        Ok(json!({
            "text": text,
            "model": self.model,
            "usage": body.get("usageMetadata").cloned().unwrap_or(Value::Null),
        }))
    }
}
