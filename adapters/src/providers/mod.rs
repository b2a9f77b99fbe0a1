//! Built-in provider adapters
//!
//! One module per provider. Each exposes its provider key, its default
//! [`ProviderSettings`] and an adapter type implementing [`ValidatedAdapter`](crate::traits::ValidatedAdapter).

pub mod anthropic;
pub mod echo;
pub mod gemini;
pub mod meshy;
pub mod openai;
pub mod openai_image;
pub mod replicate;
pub mod stability;

use shared::{reserved, ParamReader, ParameterError};

use crate::traits::{constructor, AdapterConstructor};
use crate::types::ProviderSettings;

pub use anthropic::AnthropicAdapter;
pub use echo::EchoAdapter;
pub use gemini::GeminiAdapter;
pub use meshy::MeshyAdapter;
pub use openai::OpenAiChatAdapter;
pub use openai_image::OpenAiImageAdapter;
pub use replicate::ReplicateAdapter;
pub use stability::StabilityVideoAdapter;

/// Registration record for one provider
#[derive(Clone)]
pub struct ProviderEntry {
    pub key: &'static str,
    pub constructor: AdapterConstructor,
    pub defaults: ProviderSettings,
    /// Environment variables that may hold this provider's credential, in preference order
    pub credential_vars: &'static [&'static str],
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("key", &self.key)
            .field("defaults", &self.defaults)
            .field("credential_vars", &self.credential_vars)
            .finish_non_exhaustive()
    }
}

/// Every provider shipped with the crate
pub fn builtin() -> Vec<ProviderEntry> {
    vec![
        ProviderEntry {
            key: echo::PROVIDER,
            constructor: constructor::<EchoAdapter>(),
            defaults: echo::default_settings(),
            credential_vars: &[],
        },
        ProviderEntry {
            key: openai::PROVIDER,
            constructor: constructor::<OpenAiChatAdapter>(),
            defaults: openai::default_settings(),
            credential_vars: &["OPENAI_API_KEY"],
        },
        ProviderEntry {
            key: anthropic::PROVIDER,
            constructor: constructor::<AnthropicAdapter>(),
            defaults: anthropic::default_settings(),
            credential_vars: &["ANTHROPIC_API_KEY"],
        },
        ProviderEntry {
            key: gemini::PROVIDER,
            constructor: constructor::<GeminiAdapter>(),
            defaults: gemini::default_settings(),
            credential_vars: &["GOOGLE_API_KEY", "GOOGLE_AI_API_KEY"],
        },
        ProviderEntry {
            key: openai_image::PROVIDER,
            constructor: constructor::<OpenAiImageAdapter>(),
            defaults: openai_image::default_settings(),
            credential_vars: &["OPENAI_API_KEY"],
        },
        ProviderEntry {
            key: replicate::PROVIDER,
            constructor: constructor::<ReplicateAdapter>(),
            defaults: replicate::default_settings(),
            credential_vars: &["REPLICATE_API_TOKEN"],
        },
        ProviderEntry {
            key: stability::PROVIDER,
            constructor: constructor::<StabilityVideoAdapter>(),
            defaults: stability::default_settings(),
            credential_vars: &["STABILITY_API_KEY"],
        },
        ProviderEntry {
            key: meshy::PROVIDER,
            constructor: constructor::<MeshyAdapter>(),
            defaults: meshy::default_settings(),
            credential_vars: &["MESHY_API_KEY"],
        },
    ]
}

/// Credential from the `api_key` parameter, else from settings
pub(crate) fn credential(reader: &ParamReader<'_>, settings: &ProviderSettings) -> Result<String, ParameterError> {
    reader
        .optional_str(reserved::API_KEY)
        .or_else(|| settings.api_key.clone().filter(|key| !key.trim().is_empty()))
        .ok_or_else(|| ParameterError::Missing {
            field: reserved::API_KEY.to_string(),
        })
}

/// Endpoint from the `base_url` parameter, else from settings, without trailing slash
pub(crate) fn base_url(reader: &ParamReader<'_>, settings: &ProviderSettings) -> String {
    reader
        .optional_str(reserved::BASE_URL)
        .unwrap_or_else(|| settings.base_url.clone())
        .trim_end_matches('/')
        .to_string()
}

/// Model from the `model` parameter, else from settings
pub(crate) fn model(reader: &ParamReader<'_>, settings: &ProviderSettings) -> Result<String, ParameterError> {
    reader
        .optional_str(reserved::MODEL)
        .or_else(|| settings.model.clone())
        .ok_or_else(|| ParameterError::Missing {
            field: reserved::MODEL.to_string(),
        })
}

pub(crate) fn bearer(token: &str) -> (String, String) {
    ("Authorization".to_string(), format!("Bearer {token}"))
}

pub(crate) fn json_content_type() -> (String, String) {
    ("Content-Type".to_string(), "application/json".to_string())
}
