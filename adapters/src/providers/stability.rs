//! Stability image-to-video
//!
//! Uploads a local image as multipart, then polls the result endpoint while
//! it answers HTTP 202. The finished video comes back as raw bytes and is
//! returned base64-encoded.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};
use std::time::Duration;

use shared::{FilePayload, ParamReader, ParameterError, Parameters};

use super::{base_url, bearer, credential};
use crate::error::{AdapterResult, TaskFailure};
use crate::poller::{status_code_is, Poller};
use crate::traits::{Adapter, HttpTransport, ValidatedAdapter};
use crate::types::{classify, FormPart, Headers, HttpRequest, PollPolicy, ProviderSettings};

pub const PROVIDER: &str = "stability-video";

const STILL_RENDERING: u16 = 202;

pub fn default_settings() -> ProviderSettings {
    ProviderSettings::new("https://api.stability.ai/v2beta").with_poll(PollPolicy::every(Duration::from_secs(5)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct StabilityVideoAdapter {
    base_url: String,
    api_key: String,
    image: FilePayload,
    seed: u64,
    cfg_scale: f64,
    motion_bucket_id: u32,
    poller: Poller,
}

impl ValidatedAdapter for StabilityVideoAdapter {
    fn validate(parameters: &Parameters, settings: &ProviderSettings) -> Result<Self, ParameterError> {
        let reader = ParamReader::new(parameters);
        Ok(Self {
            api_key: credential(&reader, settings)?,
            image: reader.required_file("image")?,
            base_url: base_url(&reader, settings),
            seed: reader.u64_in("seed", 0..=4_294_967_294, 0),
            cfg_scale: reader.f64_in("cfg_scale", 0.0..=10.0, 1.8),
            motion_bucket_id: reader.u32_in("motion_bucket_id", 1..=255, 127),
            poller: Poller::new(settings.poll),
        })
    }
}

impl StabilityVideoAdapter {
    fn form(&self) -> Vec<FormPart> {
        vec![
            FormPart::File {
                name: "image".to_string(),
                file_name: self.image.file_name(),
                mime_type: self.image.mime_type().to_string(),
                bytes: self.image.bytes.clone(),
            },
            FormPart::text("seed", self.seed),
            FormPart::text("cfg_scale", self.cfg_scale),
            FormPart::text("motion_bucket_id", self.motion_bucket_id),
        ]
    }

    fn with_accept(headers: &Headers, accept: &str) -> Headers {
        let mut headers = headers.clone();
        headers.push(("Accept".to_string(), accept.to_string()));
        headers
    }
}

#[async_trait]
impl Adapter for StabilityVideoAdapter {
    fn provider(&self) -> &str {
        PROVIDER
    }

    fn configure(&self) -> Headers {
        // Content-Type is left to the transport so the multipart boundary is set
        vec![bearer(&self.api_key)]
    }

    async fn execute(&self, transport: &dyn HttpTransport, headers: Headers) -> AdapterResult<Value> {
        let submit = HttpRequest::post_multipart(
            format!("{}/image-to-video", self.base_url),
            Self::with_accept(&headers, "application/json"),
            self.form(),
        );
        let submitted = classify(transport.call(submit).await?)?;
        let generation_id = submitted
            .json_field("id")
            .ok_or_else(|| TaskFailure::unexpected("Generation response has no id"))?;

        let result_url = format!("{}/image-to-video/result/{}", self.base_url, generation_id);
        let result_headers = Self::with_accept(&headers, "video/*");

        let terminal = self
            .poller
            .poll(
                || transport.call(HttpRequest::get(result_url.clone(), result_headers.clone())),
                status_code_is(STILL_RENDERING),
            )
            .await?;

        let finished = classify(terminal)?;
        Ok(json!({
            "id": generation_id,
            "mime_type": finished.content_type.clone().unwrap_or_else(|| "video/mp4".to_string()),
            "video": STANDARD.encode(&finished.body),
        }))
    }
}
