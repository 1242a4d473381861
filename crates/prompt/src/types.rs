//! Prompt types and the fixed behavioral contract.
//!
//! This module defines the assembled-prompt type plus the two string
//! constants that make up the no-match contract: the refusal sentence the
//! generator is instructed to emit, and the shorter phrase matched against
//! raw answers downstream. Matching is substring-based on the generator's
//! literal output; it is a documented textual contract, not a structural
//! guarantee.

use serde::{Deserialize, Serialize};

/// The exact sentence the generator is instructed to return when the
/// retrieved context contains nothing relevant to the question.
pub const REFUSAL_TEXT: &str =
    "I'm sorry, there is no specific information found about that in the available documents.";

/// Phrase used downstream to detect a no-match answer.
///
/// Must be a substring of [`REFUSAL_TEXT`] so that a well-behaved generator
/// following the instructions is always detected.
pub const NO_MATCH_PHRASE: &str = "no specific information found";

/// Placeholder context block used when no relevant excerpts survived
/// retrieval but the generator is still consulted (e.g., off-topic queries).
pub const EMPTY_CONTEXT_NOTE: &str = "(no relevant excerpts were retrieved)";

/// A fully rendered prompt, ready for the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledPrompt {
    /// System message carrying the behavioral rules
    pub system: String,

    /// User message: context block plus the question
    pub user: String,

    /// Number of context excerpts included
    pub chunk_count: usize,

    /// Size of the context block in characters
    pub context_chars: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_text_contains_no_match_phrase() {
        // The downstream detector must fire on the instructed refusal.
        assert!(REFUSAL_TEXT.contains(NO_MATCH_PHRASE));
    }
}
