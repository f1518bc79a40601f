// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{LlmError, Result};
use crate::provider::TextModel;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, trace};
use url::Url;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> GeminiClientBuilder {
        GeminiClientBuilder::new(api_key)
    }

    fn endpoint(&self) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        ))
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn ask(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint()?;
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self.client.post(url).json(&request).send().await?;

        let status = response.status();
        debug!(target: "llm", "response status: {}", status);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        trace!(target: "llm", "response body: {}", body);

        Ok(extract_answer_text(&body))
    }
}

/// Pull `candidates[0].content.parts[*].text` out of a `generateContent` envelope.
///
/// Falls back to the raw body when the envelope is unreadable or carries no
/// text, so callers can still bracket-scan it.
pub(crate) fn extract_answer_text(body: &str) -> String {
    let Ok(envelope) = serde_json::from_str::<GenerateContentResponse>(body) else {
        return body.to_string();
    };

    let joined = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    let joined = joined.trim();
    if joined.is_empty() {
        body.to_string()
    } else {
        joined.to_string()
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Builder for configuring a Gemini client.
#[derive(Debug)]
pub struct GeminiClientBuilder {
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GeminiClient> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(GeminiClient {
            client,
            base_url: self.base_url,
            model: self.model,
            api_key: self.api_key,
        })
    }
}
