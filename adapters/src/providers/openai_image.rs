//! OpenAI image generation

use async_trait::async_trait;
use serde_json::{json, Value};

use shared::{ParamReader, ParameterError, Parameters};

use super::{base_url, bearer, credential, json_content_type, model};
use crate::error::{AdapterResult, TaskFailure};
use crate::traits::{Adapter, HttpTransport, ValidatedAdapter};
use crate::types::{classify, Headers, HttpRequest, ProviderSettings};

pub const PROVIDER: &str = "openai-image";

const SIZES: &[&str] = &["256x256", "512x512", "1024x1024", "1792x1024", "1024x1792"];
const DEFAULT_SIZE: &str = "1024x1024";

pub fn default_settings() -> ProviderSettings {
    ProviderSettings::new("https://api.openai.com/v1").with_model("dall-e-3")
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiImageAdapter {
    base_url: String,
    api_key: String,
    model: String,
    prompt: String,
    size: String,
    count: u32,
}

impl ValidatedAdapter for OpenAiImageAdapter {
    fn validate(parameters: &Parameters, settings: &ProviderSettings) -> Result<Self, ParameterError> {
        let reader = ParamReader::new(parameters);
        Ok(Self {
            prompt: reader.required_str("prompt")?,
            api_key: credential(&reader, settings)?,
            model: model(&reader, settings)?,
            base_url: base_url(&reader, settings),
            size: reader.one_of("size", SIZES, DEFAULT_SIZE),
            count: reader.u32_in("n", 1..=4, 1),
        })
    }
}

#[async_trait]
impl Adapter for OpenAiImageAdapter {
    fn provider(&self) -> &str {
        PROVIDER
    }

    fn configure(&self) -> Headers {
        vec![bearer(&self.api_key), json_content_type()]
    }

    async fn execute(&self, transport: &dyn HttpTransport, headers: Headers) -> AdapterResult<Value> {
        let body = json!({
            "model": self.model,
            "prompt": self.prompt,
            "n": self.count,
            "size": self.size,
        });

        let url = format!("{}/images/generations", self.base_url);
        let response = classify(transport.call(HttpRequest::post_json(url, headers, body)).await?)?;
        let body = response.parse_json()?;

        let images: Vec<Value> = body
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| TaskFailure::unexpected("No image data in response"))?
            .iter()
            .filter_map(|item| item.get("url").or_else(|| item.get("b64_json")).cloned())
            .collect();

        if images.is_empty() {
            return Err(TaskFailure::unexpected("Response contained no images"));
        }

        Ok(json!({ "images": images, "size": self.size }))
    }
}
