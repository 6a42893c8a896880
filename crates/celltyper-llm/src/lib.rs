//! Celltyper LLM Provider Layer
//!
//! Implementations of the `ChatProvider` trait from `celltyper-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use celltyper_llm::MockProvider;
//! use celltyper_domain::{ChatProvider, ChatRequest};
//!
//! let provider = MockProvider::new("T cell\nB cell");
//! let reply = provider.chat(&ChatRequest::new("test prompt")).unwrap();
//! assert_eq!(reply, "T cell\nB cell");
//! ```

#![warn(missing_docs)]

pub mod credential;
pub mod openai;

use celltyper_domain::{ChatProvider, ChatRequest};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use credential::Credential;
pub use openai::OpenAiProvider;

/// Errors that can occur during chat completion calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Credential rejected by the service
    #[error("Unauthorized: the API key was rejected")]
    Unauthorized,

    /// Invalid response from the service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Error(String),
}

/// Mock chat provider for deterministic testing
///
/// Replies are resolved in this order: the scripted queue (consumed one
/// entry per call), then a per-prompt reply, then the default reply.
/// No network calls are made.
///
/// # Examples
///
/// ```
/// use celltyper_llm::MockProvider;
/// use celltyper_domain::{ChatProvider, ChatRequest};
///
/// let mut provider = MockProvider::new("fallback");
/// provider.push_response("first");
/// provider.add_response("known prompt", "known reply");
///
/// assert_eq!(provider.chat(&ChatRequest::new("x")).unwrap(), "first");
/// assert_eq!(provider.chat(&ChatRequest::new("known prompt")).unwrap(), "known reply");
/// assert_eq!(provider.chat(&ChatRequest::new("x")).unwrap(), "fallback");
/// assert_eq!(provider.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    responses: Arc<Mutex<HashMap<String, Scripted>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed reply for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider that replies with `responses` in order, then the
    /// last one forever
    pub fn with_sequence<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let responses: Vec<String> = responses.into_iter().map(Into::into).collect();
        let mut provider = Self::new(responses.last().cloned().unwrap_or_default());
        for response in responses {
            provider.push_response(response);
        }
        provider
    }

    /// Queue a reply for the next unanswered call
    pub fn push_response(&mut self, response: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Reply(response.into()));
    }

    /// Queue a transport error for the next unanswered call
    pub fn push_error(&mut self, message: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Error(message.into()));
    }

    /// Add a fixed reply for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), Scripted::Reply(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), Scripted::Error("Mock error".to_string()));
    }

    /// Get the number of times chat was called
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }

    /// Forget recorded requests
    pub fn reset_call_count(&self) {
        lock(&self.requests).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ChatProvider for MockProvider {
    type Error = LlmError;

    fn chat(&self, request: &ChatRequest) -> Result<String, Self::Error> {
        lock(&self.requests).push(request.clone());

        let scripted = lock(&self.script)
            .pop_front()
            .or_else(|| lock(&self.responses).get(&request.prompt).cloned());

        match scripted {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Error(message)) => Err(LlmError::Other(message)),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

// A poisoned lock only means another test thread panicked mid-call; the
// recorded data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(prompt: &str) -> ChatRequest {
        ChatRequest::new(prompt)
    }

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.chat(&req("any prompt"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.chat(&req("hello")).unwrap(), "world");
        assert_eq!(provider.chat(&req("foo")).unwrap(), "bar");
        assert_eq!(provider.chat(&req("unknown")).unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_sequence_repeats_last() {
        let provider = MockProvider::with_sequence(["one", "two"]);

        assert_eq!(provider.chat(&req("p")).unwrap(), "one");
        assert_eq!(provider.chat(&req("p")).unwrap(), "two");
        assert_eq!(provider.chat(&req("p")).unwrap(), "two");
    }

    #[test]
    fn test_mock_provider_records_requests() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.chat(&req("prompt1").with_seed(7)).unwrap();
        provider.chat(&req("prompt2")).unwrap();
        assert_eq!(provider.call_count(), 2);

        let requests = provider.requests();
        assert_eq!(requests[0].prompt, "prompt1");
        assert_eq!(requests[0].seed, Some(7));
        assert_eq!(requests[1].prompt, "prompt2");

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.chat(&req("bad prompt"));
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[test]
    fn test_mock_provider_scripted_error() {
        let mut provider = MockProvider::new("ok");
        provider.push_error("connection reset");

        match provider.chat(&req("p")) {
            Err(LlmError::Other(msg)) => assert_eq!(msg, "connection reset"),
            other => panic!("Expected scripted error, got {:?}", other),
        }
        assert_eq!(provider.chat(&req("p")).unwrap(), "ok");
    }

    #[test]
    fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.chat(&req("test")).unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
