//! OpenAI-compatible Provider Implementation
//!
//! Talks to any service exposing the `/chat/completions` endpoint
//! (OpenAI, Azure-style gateways, local OpenAI-compatible servers).
//!
//! # Features
//!
//! - Blocking HTTP communication, one request per call
//! - Configurable base URL, model and request timeout
//! - Seed forwarding for reproducible sampling
//!
//! Transport failures are reported, never retried: callers decide what a
//! failure means.
//!
//! # Examples
//!
//! ```no_run
//! use celltyper_llm::{Credential, OpenAiProvider};
//!
//! let key = Credential::new("sk-...").unwrap();
//! let provider = OpenAiProvider::with_defaults(key).unwrap();
//! ```

use crate::credential::Credential;
use crate::LlmError;
use celltyper_domain::{ChatProvider, ChatRequest};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default timeout for chat requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// OpenAI-compatible chat completions provider
pub struct OpenAiProvider {
    base_url: String,
    model: String,
    credential: Credential,
    client: Client,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `base_url`: API root, e.g. "https://api.openai.com/v1"
    /// - `model`: model name, e.g. "gpt-4"
    /// - `credential`: API key sent as a bearer token
    /// - `timeout`: per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Other` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        credential: Credential,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            credential,
            client,
        })
    }

    /// Create a provider for the public OpenAI endpoint and default model
    pub fn with_defaults(credential: Credential) -> Result<Self, LlmError> {
        Self::new(
            DEFAULT_BASE_URL,
            DEFAULT_MODEL,
            credential,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Full URL of the completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request_body<'a>(&'a self, request: &'a ChatRequest) -> ChatCompletionRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if !request.system_prompt.is_empty() {
            messages.push(Message {
                role: "system",
                content: &request.system_prompt,
            });
        }
        messages.push(Message {
            role: "user",
            content: &request.prompt,
        });

        ChatCompletionRequest {
            model: &self.model,
            messages,
            seed: request.seed,
        }
    }

    fn send(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.credential.expose())
            .json(&self.request_body(request))
            .send()
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized,
                StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(self.model.clone()),
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
                _ => {
                    let error_text = response
                        .text()
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    LlmError::Communication(format!("HTTP {}: {}", status, error_text))
                }
            });
        }

        let body = response
            .text()
            .map_err(|e| LlmError::Communication(format!("Failed to read response: {}", e)))?;
        parse_completion(&body)
    }
}

/// Pull the assistant text out of a chat completions response body
fn parse_completion(body: &str) -> Result<String, LlmError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no message content".to_string()))
}

impl ChatProvider for OpenAiProvider {
    type Error = LlmError;

    fn chat(&self, request: &ChatRequest) -> Result<String, Self::Error> {
        debug!(
            "Sending {} char prompt to model '{}'",
            request.prompt.len(),
            self.model
        );
        let reply = self.send(request)?;
        debug!("Received {} char reply", reply.len());
        Ok(reply)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
