//! Lenient parameter reading
//!
//! Required values must be present and non-empty or validation fails.
//! Optional values that are missing, mistyped or out of range quietly fall
//! back to the provider default instead of failing.

use serde_json::Value;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::errors::ParameterError;
use crate::types::Parameters;

/// A local file referenced by a parameter, read during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    /// File name component, used as the upload name for multipart bodies
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    }

    /// MIME type guessed from the extension
    pub fn mime_type(&self) -> &'static str {
        let extension = self
            .path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "wav" => "audio/wav",
            "mp3" => "audio/mpeg",
            "mp4" => "video/mp4",
            _ => "application/octet-stream",
        }
    }
}

/// Read-only view over a parameter bag with the leniency policy baked in
#[derive(Debug, Clone, Copy)]
pub struct ParamReader<'a> {
    params: &'a Parameters,
}

impl<'a> ParamReader<'a> {
    pub fn new(params: &'a Parameters) -> Self {
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.params.get(key)
    }

    /// Required non-empty string
    pub fn required_str(&self, key: &str) -> Result<String, ParameterError> {
        match self.params.get(key) {
            Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.clone()),
            Some(Value::String(_)) | Some(Value::Null) | None => Err(ParameterError::Missing { field: key.to_string() }),
            Some(other) => Err(ParameterError::Invalid {
                field: key.to_string(),
                reason: format!("expected a string, found {other}"),
            }),
        }
    }

    /// Required non-empty JSON object
    pub fn required_object(&self, key: &str) -> Result<Parameters, ParameterError> {
        match self.params.get(key) {
            Some(Value::Object(map)) if !map.is_empty() => Ok(map.clone()),
            Some(Value::Object(_)) | Some(Value::Null) | None => {
                Err(ParameterError::Missing { field: key.to_string() })
            }
            Some(other) => Err(ParameterError::Invalid {
                field: key.to_string(),
                reason: format!("expected an object, found {other}"),
            }),
        }
    }

    /// Required path to a local file, read eagerly
    pub fn required_file(&self, key: &str) -> Result<FilePayload, ParameterError> {
        let raw = self.required_str(key)?;
        let path = Path::new(&raw);
        if !path.is_file() {
            return Err(ParameterError::ResourceNotFound {
                field: key.to_string(),
                path: raw,
            });
        }
        let bytes = std::fs::read(path).map_err(|_| ParameterError::ResourceNotFound {
            field: key.to_string(),
            path: raw.clone(),
        })?;
        Ok(FilePayload {
            path: path.to_path_buf(),
            bytes,
        })
    }

    /// Optional non-empty string
    pub fn optional_str(&self, key: &str) -> Option<String> {
        match self.params.get(key) {
            Some(Value::String(value)) if !value.trim().is_empty() => Some(value.clone()),
            _ => None,
        }
    }

    /// Optional string with a fallback
    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.optional_str(key).unwrap_or_else(|| default.to_string())
    }

    /// Optional string restricted to a fixed set of choices
    pub fn one_of(&self, key: &str, choices: &[&str], default: &str) -> String {
        match self.optional_str(key) {
            Some(value) if choices.contains(&value.as_str()) => value,
            _ => default.to_string(),
        }
    }

    /// Optional unsigned integer within an inclusive range
    pub fn u64_in(&self, key: &str, range: RangeInclusive<u64>, default: u64) -> u64 {
        match self.params.get(key).and_then(Value::as_u64) {
            Some(value) if range.contains(&value) => value,
            _ => default,
        }
    }

    /// Optional `u32` within an inclusive range
    pub fn u32_in(&self, key: &str, range: RangeInclusive<u32>, default: u32) -> u32 {
        let widened = u64::from(*range.start())..=u64::from(*range.end());
        // The range bounds are u32, so anything accepted fits.
        self.u64_in(key, widened, u64::from(default)) as u32
    }

    /// Optional float within an inclusive range
    pub fn f64_in(&self, key: &str, range: RangeInclusive<f64>, default: f64) -> f64 {
        match self.params.get(key).and_then(Value::as_f64) {
            Some(value) if range.contains(&value) => value,
            _ => default,
        }
    }

    /// Optional boolean
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.params.get(key).and_then(Value::as_bool).unwrap_or(default)
    }
}
