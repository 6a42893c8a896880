//! Core Annotator implementation

use crate::batching::{Batch, Batcher};
use crate::config::AnnotatorConfig;
use crate::error::AnnotatorError;
use crate::normalize::label_batch;
use crate::prompt::PromptBuilder;
use crate::query::QueryLoop;
use crate::signature::extract_signatures;
use celltyper_domain::{
    Annotation, AnnotationInput, ChatProvider, ChatRequest, GroupSignature, LabelResult,
};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Notice emitted when no chat provider is configured
pub const PROMPT_ONLY_NOTICE: &str =
    "Note: API key not found: returning the prompt itself.";

/// Reminder emitted after every queried run
pub const VERIFY_REMINDER: &str = "Note: It is always recommended to check the results \
     returned by the model in case of AI hallucination, before going to down-stream analysis.";

/// The Annotator assigns cell-type labels to groups of marker genes
///
/// Without a provider it runs in prompt-only mode and returns the rendered
/// prompt instead of querying a model.
pub struct Annotator<L>
where
    L: ChatProvider,
{
    provider: Option<Arc<L>>,
    config: AnnotatorConfig,
}

impl<L> Annotator<L>
where
    L: ChatProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new Annotator; `None` selects prompt-only mode
    pub fn new(provider: Option<L>, config: AnnotatorConfig) -> Self {
        Self {
            provider: provider.map(Arc::new),
            config,
        }
    }

    /// True if no provider is configured
    pub fn is_prompt_only(&self) -> bool {
        self.provider.is_none()
    }

    /// Active configuration
    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Render the unbatched prompt covering every group
    pub fn prompt_for(
        &self,
        input: &AnnotationInput,
        tissue: Option<&str>,
    ) -> Result<String, AnnotatorError> {
        let signatures = extract_signatures(input, self.config.top_gene_number)?;
        Ok(PromptBuilder::new(&signatures).with_tissue(tissue).build())
    }

    /// Annotate every group in `input`
    ///
    /// Returns `Annotation::Prompt` in prompt-only mode and
    /// `Annotation::Labels` (one per group, in input order) otherwise. An
    /// input with no groups yields empty labels in either mode.
    pub async fn annotate(
        &self,
        input: &AnnotationInput,
        tissue: Option<&str>,
    ) -> Result<Annotation, AnnotatorError> {
        self.config.validate().map_err(AnnotatorError::Config)?;

        let signatures = extract_signatures(input, self.config.top_gene_number)?;
        if signatures.is_empty() {
            info!("No groups in {}, nothing to annotate", input.kind());
            return Ok(Annotation::Labels(Vec::new()));
        }

        let Some(provider) = &self.provider else {
            info!("{}", PROMPT_ONLY_NOTICE);
            let prompt = PromptBuilder::new(&signatures).with_tissue(tissue).build();
            return Ok(Annotation::Prompt(prompt));
        };

        let start = Instant::now();
        let batcher = Batcher::new(self.config.max_batch_size);
        let batches = batcher.partition(&signatures);

        info!(
            "Annotating {} groups in {} batch(es) with model '{}'",
            signatures.len(),
            batches.len(),
            provider.model_name()
        );

        // Every batch is driven to completion so no query loop outlives the
        // call; after the first failure the rest stop before their next
        // request.
        let cancelled = Arc::new(AtomicBool::new(false));
        let outcomes: Vec<Result<Vec<LabelResult>, AnnotatorError>> = stream::iter(
            batches.iter().map(|batch| {
                self.annotate_batch(Arc::clone(provider), *batch, tissue, Arc::clone(&cancelled))
            }),
        )
        .buffered(self.config.concurrent_batches)
        .collect()
        .await;

        let mut labels = Vec::with_capacity(signatures.len());
        let mut failure: Option<AnnotatorError> = None;
        for outcome in outcomes {
            match outcome {
                Ok(batch_labels) => labels.extend(batch_labels),
                Err(e) => {
                    // Report the failure that caused the cancellation
                    let replace = match &failure {
                        None => true,
                        Some(AnnotatorError::Cancelled { .. }) => {
                            !matches!(e, AnnotatorError::Cancelled { .. })
                        }
                        Some(_) => false,
                    };
                    if replace {
                        failure = Some(e);
                    }
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        info!(
            "Annotation complete: {} labels in {} ms",
            labels.len(),
            start.elapsed().as_millis()
        );
        info!("{}", VERIFY_REMINDER);

        Ok(Annotation::Labels(labels))
    }

    /// Run the query loop for one batch and normalise its reply
    async fn annotate_batch(
        &self,
        provider: Arc<L>,
        batch: Batch<'_>,
        tissue: Option<&str>,
        cancelled: Arc<AtomicBool>,
    ) -> Result<Vec<LabelResult>, AnnotatorError> {
        if cancelled.load(Ordering::Relaxed) {
            return Err(AnnotatorError::Cancelled { batch: batch.index });
        }

        let request = self.request_for(batch.signatures, tissue);
        debug!(
            "Batch {}: {} groups, prompt length {} chars",
            batch.index,
            batch.len(),
            request.prompt.len()
        );

        let expected = batch.len();
        let index = batch.index;
        let max_attempts = self.config.max_attempts;

        // The provider blocks, so keep it off the async workers
        let flag = Arc::clone(&cancelled);
        let outcome = tokio::task::spawn_blocking(move || {
            QueryLoop::new(provider.as_ref(), request, expected)
                .with_batch_index(index)
                .with_max_attempts(max_attempts)
                .with_cancellation(flag)
                .run()
        })
        .await
        .map_err(|e| AnnotatorError::Join(e.to_string()))
        .and_then(|result| result);

        if outcome.is_err() {
            cancelled.store(true, Ordering::Relaxed);
        }
        let accepted = outcome?;

        info!(
            "Batch {} annotated ({} groups, {} attempt(s))",
            index, expected, accepted.attempts
        );

        Ok(label_batch(&batch, &accepted.lines))
    }

    fn request_for(&self, signatures: &[GroupSignature], tissue: Option<&str>) -> ChatRequest {
        let prompt = PromptBuilder::new(signatures).with_tissue(tissue).build();
        ChatRequest::new(prompt)
            .with_system_prompt(self.config.system_prompt.clone())
            .with_seed(self.config.seed)
    }
}
