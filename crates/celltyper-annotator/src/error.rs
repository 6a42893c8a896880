//! Error types for the Annotator

use thiserror::Error;

/// Errors that can occur during annotation
#[derive(Error, Debug)]
pub enum AnnotatorError {
    /// Chat provider (transport) error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Model kept returning the wrong number of lines for a batch
    #[error(
        "Batch {batch}: expected {expected} labels but received {received} \
         (gave up after {attempts} attempts)"
    )]
    ShapeMismatch {
        /// Zero-based batch index
        batch: usize,
        /// Number of groups in the batch
        expected: usize,
        /// Line count of the last reply
        received: usize,
        /// Replies requested before giving up
        attempts: u32,
    },

    /// Batch stopped because another batch of the same run failed
    #[error("Batch {batch} cancelled after another batch failed")]
    Cancelled {
        /// Zero-based batch index
        batch: usize,
    },

    /// Differential table lacks required columns
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Input could not be interpreted
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two groups share an identifier
    #[error("Duplicate group identifier: {0}")]
    DuplicateGroup(String),

    /// CSV parsing error
    #[error("CSV parse error: {0}")]
    Csv(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task failed to complete
    #[error("Task join error: {0}")]
    Join(String),
}

impl From<serde_json::Error> for AnnotatorError {
    fn from(e: serde_json::Error) -> Self {
        AnnotatorError::JsonParse(e.to_string())
    }
}

impl From<csv::Error> for AnnotatorError {
    fn from(e: csv::Error) -> Self {
        AnnotatorError::Csv(e.to_string())
    }
}
