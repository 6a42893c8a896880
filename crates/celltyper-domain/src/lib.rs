//! Celltyper Domain Layer
//!
//! Core types and trait seams for annotating single-cell clusters with
//! cell-type labels. This crate has no external dependencies; transport and
//! I/O live in other crates.
//!
//! ## Key Concepts
//!
//! - **Group**: a cluster (table input) or a named gene set (list input)
//! - **Signature**: the comma-joined marker genes that represent a group
//! - **Label**: the cell-type name the model assigns to a group
//! - **Chat provider**: the opaque collaborator that turns a prompt into text
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure data types only
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod annotation;
pub mod group;
pub mod input;
pub mod traits;

// Re-exports for convenience
pub use annotation::{Annotation, LabelResult};
pub use group::GroupSignature;
pub use input::{AnnotationInput, DifferentialRow, GeneList};
pub use traits::{ChatProvider, ChatRequest};
