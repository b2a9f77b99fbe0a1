//! Replicate predictions (image, audio, video models)
//!
//! Asynchronous: a prediction is created, then its status is polled while it
//! is `starting` or `processing`.

use async_trait::async_trait;
use serde_json::{json, Value};

use shared::{ParamReader, ParameterError, Parameters};

use super::{base_url, bearer, credential, json_content_type};
use crate::error::{AdapterResult, TaskFailure};
use crate::poller::{status_in, Poller};
use crate::traits::{Adapter, HttpTransport, ValidatedAdapter};
use crate::types::{classify, Headers, HttpRequest, PollPolicy, ProviderSettings};

pub const PROVIDER: &str = "replicate";

const IN_PROGRESS: &[&str] = &["starting", "processing"];

pub fn default_settings() -> ProviderSettings {
    ProviderSettings::new("https://api.replicate.com/v1").with_poll(PollPolicy::every(std::time::Duration::from_secs(3)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateAdapter {
    base_url: String,
    api_token: String,
    version: String,
    input: Parameters,
    poller: Poller,
}

impl ValidatedAdapter for ReplicateAdapter {
    fn validate(parameters: &Parameters, settings: &ProviderSettings) -> Result<Self, ParameterError> {
        let reader = ParamReader::new(parameters);
        Ok(Self {
            version: reader.required_str("version")?,
            input: reader.required_object("input")?,
            api_token: credential(&reader, settings)?,
            base_url: base_url(&reader, settings),
            poller: Poller::new(settings.poll),
        })
    }
}

#[async_trait]
impl Adapter for ReplicateAdapter {
    fn provider(&self) -> &str {
        PROVIDER
    }

    fn configure(&self) -> Headers {
        vec![bearer(&self.api_token), json_content_type()]
    }

    async fn execute(&self, transport: &dyn HttpTransport, headers: Headers) -> AdapterResult<Value> {
        let body = json!({ "version": self.version, "input": self.input });
        let created = classify(
            transport
                .call(HttpRequest::post_json(format!("{}/predictions", self.base_url), headers.clone(), body))
                .await?,
        )?;

        let prediction_id = created
            .json_field("id")
            .ok_or_else(|| TaskFailure::unexpected("Prediction response has no id"))?;
        let status_url = format!("{}/predictions/{}", self.base_url, prediction_id);

        let terminal = self
            .poller
            .poll(
                || transport.call(HttpRequest::get(status_url.clone(), headers.clone())),
                status_in("status", IN_PROGRESS),
            )
            .await?;

        let prediction = classify(terminal)?.parse_json()?;
        match prediction.get("status").and_then(Value::as_str) {
            Some("succeeded") => Ok(json!({
                "id": prediction_id,
                "output": prediction.get("output").cloned().unwrap_or(Value::Null),
            })),
            Some(status) => {
                let reason = prediction
                    .get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("prediction {status}"));
                Err(TaskFailure::JobFailed { message: reason })
            }
            None => Err(TaskFailure::unexpected("Prediction status missing")),
        }
    }
}
