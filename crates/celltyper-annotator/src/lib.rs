//! Celltyper Annotator
//!
//! Labels single-cell clusters with probable cell types by asking a chat
//! model.
//!
//! # Overview
//!
//! Input is either a differential-expression table or a set of marker-gene
//! lists. Each group is reduced to a marker signature, groups are batched
//! to respect request-size limits, and each batch is rendered into one
//! prompt. The reply must contain exactly one line per group; a reply with
//! the wrong line count is discarded and the batch is asked again.
//!
//! # Architecture
//!
//! ```text
//! Input → Signatures → Batches → Prompt → Query-Validate Loop → Labels
//! ```
//!
//! Without a chat provider the pipeline stops after prompt rendering and
//! returns the prompt for all groups in one piece.
//!
//! # Example Usage
//!
//! ```no_run
//! use celltyper_annotator::{Annotator, AnnotatorConfig};
//! use celltyper_domain::{AnnotationInput, GeneList};
//! use celltyper_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("T cell\nB cell");
//! let annotator = Annotator::new(Some(llm), AnnotatorConfig::default());
//!
//! let input = AnnotationInput::GeneLists(vec![
//!     GeneList::new("A", ["CD3E", "CD4"]),
//!     GeneList::new("B", ["CD19"]),
//! ]);
//!
//! let result = annotator.annotate(&input, Some("blood")).await?;
//! println!("A is {:?}", result.label_for("A"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod annotator;
mod batching;
mod config;
mod error;
mod input;
mod normalize;
mod prompt;
mod query;
mod signature;


pub use annotator::{Annotator, PROMPT_ONLY_NOTICE, VERIFY_REMINDER};
pub use batching::{Batch, Batcher};
pub use config::AnnotatorConfig;
pub use error::AnnotatorError;
pub use input::{delimiter_for_path, read_differential_table, read_gene_lists, REQUIRED_COLUMNS};
pub use normalize::{normalize_label, split_reply};
pub use prompt::PromptBuilder;
pub use query::{AcceptedReply, QueryLoop, QueryState};
pub use signature::{extract_signatures, P_VAL_ADJ_THRESHOLD};
