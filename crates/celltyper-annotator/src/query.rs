//! Query-validate loop: ask until the reply has one line per group
//!
//! ```text
//! AwaitingReply --reply--> Validating --count ok--> Accepted
//!       ^                       |
//!       +------count mismatch---+
//! ```
//!
//! A mismatch discards the whole reply and re-sends the identical request.
//! There is no backoff; the loop is about output shape, not transport
//! health. Transport errors end the loop immediately, as does the run's
//! shared cancellation flag, which is checked before every request.

use crate::error::AnnotatorError;
use crate::normalize::split_reply;
use celltyper_domain::{ChatProvider, ChatRequest};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// State of one batch's query loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    /// Request sent, waiting for the provider
    AwaitingReply {
        /// 1-based attempt number
        attempt: u32,
    },

    /// Reply received, line count being checked
    Validating {
        /// 1-based attempt number
        attempt: u32,
        /// Raw reply lines
        lines: Vec<String>,
    },

    /// Line count matched (terminal)
    Accepted {
        /// Attempts it took
        attempts: u32,
        /// Exactly one raw line per group
        lines: Vec<String>,
    },
}

/// Result of a successful query loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedReply {
    /// Exactly one raw line per group, in group order
    pub lines: Vec<String>,

    /// Requests issued before acceptance
    pub attempts: u32,
}

/// Runs the query loop for a single batch
pub struct QueryLoop<'a, L> {
    provider: &'a L,
    request: ChatRequest,
    expected: usize,
    batch_index: usize,
    max_attempts: Option<u32>,
    cancelled: Option<Arc<AtomicBool>>,
}

impl<'a, L> QueryLoop<'a, L>
where
    L: ChatProvider,
    L::Error: std::fmt::Display,
{
    /// Create a loop expecting `expected` lines per reply
    pub fn new(provider: &'a L, request: ChatRequest, expected: usize) -> Self {
        Self {
            provider,
            request,
            expected,
            batch_index: 0,
            max_attempts: None,
            cancelled: None,
        }
    }

    /// Batch index used in logs and errors
    pub fn with_batch_index(mut self, batch_index: usize) -> Self {
        self.batch_index = batch_index;
        self
    }

    /// Cap the total number of requests, the first included; `None` asks
    /// forever
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Stop before the next request once `cancelled` is set
    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(cancelled);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Drive the state machine to `Accepted`
    pub fn run(&self) -> Result<AcceptedReply, AnnotatorError> {
        let mut state = QueryState::AwaitingReply { attempt: 1 };

        loop {
            state = match state {
                QueryState::AwaitingReply { attempt } => {
                    if self.is_cancelled() {
                        debug!(
                            "Batch {} cancelled before attempt {}",
                            self.batch_index, attempt
                        );
                        return Err(AnnotatorError::Cancelled {
                            batch: self.batch_index,
                        });
                    }
                    let reply = self
                        .provider
                        .chat(&self.request)
                        .map_err(|e| AnnotatorError::Llm(e.to_string()))?;
                    QueryState::Validating {
                        attempt,
                        lines: split_reply(&reply).into_iter().map(str::to_string).collect(),
                    }
                }
                QueryState::Validating { attempt, lines } => {
                    if lines.len() == self.expected {
                        QueryState::Accepted {
                            attempts: attempt,
                            lines,
                        }
                    } else {
                        warn!(
                            "Batch {}: expected {} labels, received {} (attempt {})",
                            self.batch_index,
                            self.expected,
                            lines.len(),
                            attempt
                        );
                        if self.max_attempts.is_some_and(|cap| attempt >= cap) {
                            return Err(AnnotatorError::ShapeMismatch {
                                batch: self.batch_index,
                                expected: self.expected,
                                received: lines.len(),
                                attempts: attempt,
                            });
                        }
                        QueryState::AwaitingReply {
                            attempt: attempt.saturating_add(1),
                        }
                    }
                }
                QueryState::Accepted { attempts, lines } => {
                    debug!(
                        "Batch {} accepted after {} attempt(s)",
                        self.batch_index, attempts
                    );
                    return Ok(AcceptedReply { lines, attempts });
                }
            };
        }
    }
}
