//! Adapter-facing data types: wire requests, responses and provider settings

use serde_json::Value;
use std::time::Duration;

use crate::error::{AdapterResult, TaskFailure};

/// Status codes a provider may answer with for a request to count as accepted
pub const ACCEPTED_STATUSES: [u16; 3] = [200, 201, 202];

/// Transport headers as ordered name/value pairs
pub type Headers = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One field of a multipart form body
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl ToString) -> Self {
        FormPart::Text {
            name: name.into(),
            value: value.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// A single outbound call through the network boundary
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>, headers: Headers) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers,
            body: RequestBody::Empty,
        }
    }

    pub fn post_json(url: impl Into<String>, headers: Headers, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers,
            body: RequestBody::Json(body),
        }
    }

    pub fn post_multipart(url: impl Into<String>, headers: Headers, parts: Vec<FormPart>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers,
            body: RequestBody::Multipart(parts),
        }
    }
}

/// Raw answer from the network boundary, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: None,
        }
    }

    /// JSON response, mostly for fakes and tests
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string().into_bytes(),
            content_type: Some("application/json".to_string()),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_accepted(&self) -> bool {
        ACCEPTED_STATUSES.contains(&self.status)
    }

    /// Body as text, lossy for binary payloads
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON
    pub fn parse_json(&self) -> AdapterResult<Value> {
        serde_json::from_slice(&self.body)
            .map_err(|e| TaskFailure::unexpected(format!("response is not valid JSON: {e}")))
    }

    /// Top-level string field of a JSON body, if the body parses
    pub fn json_field(&self, field: &str) -> Option<String> {
        let value: Value = serde_json::from_slice(&self.body).ok()?;
        value.get(field).and_then(Value::as_str).map(str::to_string)
    }
}

/// Apply the fixed accepted/failed classification table
///
/// Anything outside [`ACCEPTED_STATUSES`] becomes a transport failure
/// carrying `"{status} - {body}"`.
pub fn classify(response: HttpResponse) -> AdapterResult<HttpResponse> {
    if response.is_accepted() {
        Ok(response)
    } else {
        Err(TaskFailure::Transport {
            status: response.status,
            body: response.text(),
        })
    }
}

/// How the poller waits on an asynchronous provider job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed wait between status queries
    pub delay: Duration,
    /// Upper bound on status queries; `None` polls until the job is terminal
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    pub fn every(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::every(Duration::from_secs(3))
    }
}

/// Per-provider defaults injected into adapters at validation time
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub poll: PollPolicy,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: None,
            max_tokens: 1024,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}
