//! reqwest-backed network boundary

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::{AdapterResult, TaskFailure};
use crate::traits::HttpTransport;
use crate::types::{FormPart, HttpMethod, HttpRequest, HttpResponse, RequestBody};

/// Real HTTP transport shared by every adapter in a batch
#[derive(Debug, Clone)]
pub struct RealHttpTransport {
    client: reqwest::Client,
}

impl RealHttpTransport {
    /// Create transport with reqwest defaults
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create transport whose individual requests give up after `timeout`
    ///
    /// This bounds a single call, not a whole poll loop.
    pub fn with_timeout(timeout: Duration) -> AdapterResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TaskFailure::Request { message: e.to_string() })?;
        Ok(Self { client })
    }

    fn multipart_form(parts: Vec<FormPart>) -> AdapterResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for part in parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    file_name,
                    mime_type,
                    bytes,
                } => {
                    let file = reqwest::multipart::Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime_type)
                        .map_err(|e| TaskFailure::Request {
                            message: format!("invalid MIME type {mime_type}: {e}"),
                        })?;
                    form.part(name, file)
                }
            };
        }
        Ok(form)
    }
}

impl Default for RealHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for RealHttpTransport {
    async fn call(&self, request: HttpRequest) -> AdapterResult<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        debug!(method = ?method, url = %url, "🌐 Sending provider request");

        let mut builder = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(Self::multipart_form(parts)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TaskFailure::Network { message: e.to_string() })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| TaskFailure::Network { message: e.to_string() })?;

        debug!(status, bytes = body.len(), url = %url, "📨 Provider responded");

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
            content_type,
        })
    }
}
