//! Prompt system for medquery.
//!
//! This crate owns the fixed instruction template used for grounded
//! answering and the textual no-match contract shared with the answer
//! synthesizer:
//! - Handlebars template rendering
//! - The three behavioral rules (grounded / no-match / off-topic)
//! - The refusal sentence and its detection phrase

pub mod builder;
pub mod types;

// Re-export main types
pub use builder::build_answer_prompt;
pub use types::{AssembledPrompt, EMPTY_CONTEXT_NOTE, NO_MATCH_PHRASE, REFUSAL_TEXT};
