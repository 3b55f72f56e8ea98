//! Data models and structures
//!
//! Defines the request/response bodies exchanged with the web client and the
//! process configuration loaded from the environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";
pub const DEFAULT_GROQ_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai";

/// Body accepted by `POST /api/extract`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub mime_type: Option<String>,
    pub data64: Option<String>,
    pub prompt: Option<String>,
}

impl ExtractRequest {
    /// Validate the payload and resolve the image it carries.
    pub fn image(&self) -> crate::Result<ImageInput> {
        let data64 = match self.data64.as_deref() {
            Some(data) if !data.is_empty() => data,
            _ => {
                return Err(crate::Error::BadRequest(
                    "No image data provided.".to_string(),
                ))
            }
        };

        let mime_type = match self.mime_type.as_deref() {
            Some(mime) if !mime.is_empty() => mime,
            _ => DEFAULT_MIME_TYPE,
        };

        Ok(ImageInput {
            mime_type: mime_type.to_string(),
            data64: data64.to_string(),
        })
    }
}

/// Base64 image plus its declared MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub mime_type: String,
    pub data64: String,
}

impl ImageInput {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data64)
    }
}

/// Success body: the extracted fields, re-serialized into a text block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractResponse {
    pub content: Vec<ContentBlock>,
}

impl ExtractResponse {
    pub fn from_fields(fields: &serde_json::Value) -> crate::Result<Self> {
        Ok(Self {
            content: vec![ContentBlock {
                block_type: "text".to_string(),
                text: serde_json::to_string(fields)?,
            }],
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: String,
}

/// Uniform failure body: `{ "error": { "message": ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
            },
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` keeps the server up but answers extraction requests with 503.
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,
    /// `None` leaves the outbound call bounded only by the network stack.
    pub request_timeout: Option<Duration>,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            groq_model: DEFAULT_GROQ_MODEL.to_string(),
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            request_timeout: Some(Duration::from_secs(90)),
            max_body_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let request_timeout = match non_empty("GROQ_TIMEOUT_SECS") {
            Some(raw) => match parse_number(&raw, "GROQ_TIMEOUT_SECS")? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => defaults.request_timeout,
        };

        let max_body_bytes = match non_empty("EXTRACT_MAX_BODY_MB") {
            Some(raw) => {
                let mb = parse_number(&raw, "EXTRACT_MAX_BODY_MB")?;
                usize::try_from(mb)
                    .ok()
                    .and_then(|mb| mb.checked_mul(1024 * 1024))
                    .ok_or_else(|| {
                        crate::Error::Config(format!("EXTRACT_MAX_BODY_MB too large: {}", mb))
                    })?
            }
            None => defaults.max_body_bytes,
        };

        Ok(Self {
            groq_api_key: non_empty("GROQ_API_KEY").map(|key| key.trim().to_string()),
            groq_model: non_empty("GROQ_MODEL").unwrap_or(defaults.groq_model),
            groq_base_url: non_empty("GROQ_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.groq_base_url),
            request_timeout,
            max_body_bytes,
        })
    }
}

fn parse_number(raw: &str, key: &str) -> crate::Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| crate::Error::Config(format!("{} must be a whole number, got '{}'", key, raw)))
}
