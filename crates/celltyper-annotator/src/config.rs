//! Configuration for the Annotator

use serde::{Deserialize, Serialize};

/// Default number of top marker genes kept per cluster
pub const DEFAULT_TOP_GENE_NUMBER: usize = 20;

/// Default maximum number of groups per model request
pub const DEFAULT_MAX_BATCH_SIZE: usize = 30;

/// Default sampling seed sent with every request
pub const DEFAULT_SEED: u64 = 42;

/// Default system message
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an expert in single-cell RNA sequencing and cell type annotation.";

/// Configuration for the Annotator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Maximum marker genes per cluster in table mode
    #[serde(default = "default_top_gene_number")]
    pub top_gene_number: usize,

    /// Maximum groups sent in one request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Total requests per batch, the first included, before giving up on
    /// a line-count mismatch; unset asks forever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Sampling seed forwarded to the chat service
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// System message sent ahead of every prompt
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Batches in flight at once; 1 processes batches strictly in order
    #[serde(default = "default_concurrent_batches")]
    pub concurrent_batches: usize,
}

fn default_top_gene_number() -> usize {
    DEFAULT_TOP_GENE_NUMBER
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_concurrent_batches() -> usize {
    1
}

impl AnnotatorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.top_gene_number == 0 {
            return Err("top_gene_number must be greater than 0".to_string());
        }
        if self.max_batch_size == 0 {
            return Err("max_batch_size must be greater than 0".to_string());
        }
        if self.max_attempts == Some(0) {
            return Err("max_attempts must be greater than 0 when set".to_string());
        }
        if self.concurrent_batches == 0 {
            return Err("concurrent_batches must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Cap the total number of requests per batch
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Set the number of marker genes kept per cluster
    pub fn with_top_gene_number(mut self, top_gene_number: usize) -> Self {
        self.top_gene_number = top_gene_number;
        self
    }
}

impl Default for AnnotatorConfig {
    /// Default configuration: 20 genes, batches of 30, unbounded retry
    fn default() -> Self {
        Self {
            top_gene_number: DEFAULT_TOP_GENE_NUMBER,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_attempts: None,
            seed: DEFAULT_SEED,
            system_prompt: default_system_prompt(),
            concurrent_batches: 1,
        }
    }
}

impl AnnotatorConfig {
    /// Hardened preset: attempts capped so a misbehaving model fails loudly
    pub fn hardened() -> Self {
        Self {
            max_attempts: Some(10),
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
