//! Trait definitions for external interactions
//!
//! These traits define the boundaries between annotation logic and
//! infrastructure. Infrastructure implementations live in other crates.

/// A single chat completion request
///
/// Model name, endpoint and credential belong to the provider; the request
/// carries only what varies per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// System message sent ahead of the prompt
    pub system_prompt: String,

    /// User message
    pub prompt: String,

    /// Sampling seed, to bias the remote model toward reproducible output
    pub seed: Option<u64>,
}

impl ChatRequest {
    /// Create a request with no system message and no seed
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: String::new(),
            prompt: prompt.into(),
            seed: None,
        }
    }

    /// Set the system message
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Set the sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Trait for chat completion providers
///
/// Implemented by the infrastructure layer (celltyper-llm). Calls block
/// until the full reply is available or the transport fails.
pub trait ChatProvider {
    /// Error type for transport failures
    type Error;

    /// Send one request and return the assistant's reply text
    fn chat(&self, request: &ChatRequest) -> Result<String, Self::Error>;

    /// Model name, for logging
    fn model_name(&self) -> &str {
        "llm"
    }
}
