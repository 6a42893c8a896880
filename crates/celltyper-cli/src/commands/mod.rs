//! Command implementations.

pub mod annotate;
pub mod config;

pub use self::annotate::{execute_annotate, execute_prompt};
pub use self::config::execute_config;
