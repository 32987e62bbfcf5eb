//! # Gemini Description Client
//!
//! Thin wrapper around the Gemini `generateContent` endpoint that turns one
//! PNG tile into a short Japanese caption usable as a filename tag.
//!
//! The rest of the crate never sees the wire protocol: it talks to the
//! [`Describer`] trait, and failures are downgraded to fixed placeholder
//! strings by [`describe_or_placeholder`]. Requests are independent per
//! tile; there is no batching, no retry and no deduplication.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;

use crate::error::{SliceError, SliceResult};

/// Fixed instruction sent alongside every tile image.
pub const DESCRIBE_INSTRUCTION: &str = "この画像の断片に何が描かれているか、日本語で簡潔に（20文字以内）説明してください。ファイル名のタグとして使えるような形式が良いです。";

/// Shown when the service answers with empty or whitespace-only text.
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "解析できませんでした";

/// Shown when the request fails outright (transport or service error).
pub const FAILURE_PLACEHOLDER: &str = "エラーが発生しました";

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Abstract interface for tile description services.
///
/// Implementations take one encoded image and return short text. Keeping the
/// surface this narrow means the session and CLI never depend on a concrete
/// provider protocol.
#[async_trait]
pub trait Describer: Send + Sync {
    /// Request a short caption for a single PNG-encoded image.
    async fn describe(&self, png: &[u8]) -> SliceResult<String>;
}

/// [`Describer`] backed by the Gemini API.
pub struct GeminiDescriber {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiDescriber {
    /// Create a client for the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    /// Create a client for a specific Gemini model.
    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Create a client for the given model, reading the credential from
    /// the `GEMINI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> SliceResult<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| SliceError::config(API_KEY_VAR, "environment variable is not set"))?;
        Ok(Self::with_model(api_key, model))
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }
}

#[async_trait]
impl Describer for GeminiDescriber {
    async fn describe(&self, png: &[u8]) -> SliceResult<String> {
        let image_data = general_purpose::STANDARD.encode(png);
        let request_body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": "image/png", "data": image_data } },
                    { "text": DESCRIBE_INSTRUCTION },
                ]
            }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| SliceError::describe(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SliceError::describe(format!(
                "service returned status {}",
                status
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SliceError::describe(e.to_string()))?;

        Ok(parsed.text().unwrap_or_default())
    }
}

/// Describe a tile, degrading every failure to a placeholder string.
///
/// This is the seam the session uses: the returned text is always non-empty,
/// so callers can treat it as the tile's terminal description without
/// handling errors. Failures are logged, not propagated.
pub async fn describe_or_placeholder(describer: &dyn Describer, png: &[u8]) -> String {
    match describer.describe(png).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => EMPTY_RESPONSE_PLACEHOLDER.to_string(),
        Err(e) => {
            log::warn!("description request failed: {}", e);
            FAILURE_PLACEHOLDER.to_string()
        }
    }
}

/// Subset of the `generateContent` response this crate reads.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let joined: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if joined.is_empty() { None } else { Some(joined) }
    }
}
