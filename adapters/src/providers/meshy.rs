//! Meshy text-to-3D

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use shared::{ParamReader, ParameterError, Parameters};

use super::{base_url, bearer, credential, json_content_type};
use crate::error::{AdapterResult, TaskFailure};
use crate::poller::{status_in, Poller};
use crate::traits::{Adapter, HttpTransport, ValidatedAdapter};
use crate::types::{classify, Headers, HttpRequest, PollPolicy, ProviderSettings};

pub const PROVIDER: &str = "meshy";

const IN_PROGRESS: &[&str] = &["PENDING", "IN_PROGRESS"];
const ART_STYLES: &[&str] = &["realistic", "sculpture"];
const MODES: &[&str] = &["preview", "refine"];

pub fn default_settings() -> ProviderSettings {
    ProviderSettings::new("https://api.meshy.ai/openapi/v2").with_poll(PollPolicy::every(Duration::from_secs(5)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshyAdapter {
    base_url: String,
    api_key: String,
    prompt: String,
    art_style: String,
    mode: String,
    poller: Poller,
}

impl ValidatedAdapter for MeshyAdapter {
    fn validate(parameters: &Parameters, settings: &ProviderSettings) -> Result<Self, ParameterError> {
        let reader = ParamReader::new(parameters);
        Ok(Self {
            prompt: reader.required_str("prompt")?,
            api_key: credential(&reader, settings)?,
            base_url: base_url(&reader, settings),
            art_style: reader.one_of("art_style", ART_STYLES, "realistic"),
            mode: reader.one_of("mode", MODES, "preview"),
            poller: Poller::new(settings.poll),
        })
    }
}

#[async_trait]
impl Adapter for MeshyAdapter {
    fn provider(&self) -> &str {
        PROVIDER
    }

    fn configure(&self) -> Headers {
        vec![bearer(&self.api_key), json_content_type()]
    }

    async fn execute(&self, transport: &dyn HttpTransport, headers: Headers) -> AdapterResult<Value> {
        let body = json!({
            "mode": self.mode,
            "prompt": self.prompt,
            "art_style": self.art_style,
        });
        let created = classify(
            transport
                .call(HttpRequest::post_json(format!("{}/text-to-3d", self.base_url), headers.clone(), body))
                .await?,
        )?;
        let task_id = created
            .json_field("result")
            .ok_or_else(|| TaskFailure::unexpected("Task response has no result id"))?;
        let status_url = format!("{}/text-to-3d/{}", self.base_url, task_id);

        let terminal = self
            .poller
            .poll(
                || transport.call(HttpRequest::get(status_url.clone(), headers.clone())),
                status_in("status", IN_PROGRESS),
            )
            .await?;

        let task = classify(terminal)?.parse_json()?;
        match task.get("status").and_then(Value::as_str) {
            Some("SUCCEEDED") => Ok(json!({
                "id": task_id,
                "model_urls": task.get("model_urls").cloned().unwrap_or(Value::Null),
                "thumbnail_url": task.get("thumbnail_url").cloned().unwrap_or(Value::Null),
            })),
            Some(status) => {
                let reason = task
                    .pointer("/task_error/message")
                    .and_then(Value::as_str)
                    .filter(|message| !message.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("task {status}"));
                Err(TaskFailure::JobFailed { message: reason })
            }
            None => Err(TaskFailure::unexpected("Task status missing")),
        }
    }
}
