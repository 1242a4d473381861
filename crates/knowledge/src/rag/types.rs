//! Answer types.

use medquery_prompt::{NO_MATCH_PHRASE, REFUSAL_TEXT};
use serde::{Deserialize, Serialize};

/// A synthesized answer with its source citations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text from the generator (or the fixed refusal)
    pub text: String,

    /// Deduplicated, lexically sorted source document identifiers.
    /// Empty when the answer is a refusal or no relevant chunks survived.
    pub citations: Vec<String>,
}

impl Answer {
    /// The fixed refusal answer, uncited.
    pub fn refusal() -> Self {
        Self {
            text: REFUSAL_TEXT.to_string(),
            citations: vec![],
        }
    }

    /// Whether this answer declares that nothing relevant was found.
    pub fn is_refusal(&self) -> bool {
        self.text.contains(NO_MATCH_PHRASE)
    }

    /// Render the answer for display, with the citation block appended
    /// when citations exist.
    pub fn render(&self) -> String {
        if self.citations.is_empty() {
            return self.text.clone();
        }

        let mut out = self.text.clone();
        out.push_str("\n\n---\nSources:");
        for source in &self.citations {
            out.push_str("\n- ");
            out.push_str(source);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_is_uncited() {
        let answer = Answer::refusal();
        assert!(answer.is_refusal());
        assert!(answer.citations.is_empty());
        assert_eq!(answer.render(), REFUSAL_TEXT);
    }

    #[test]
    fn test_render_appends_citation_block() {
        let answer = Answer {
            text: "Aspirin reduces fever.".to_string(),
            citations: vec!["aspirin.pdf".to_string(), "drugs.txt".to_string()],
        };

        assert_eq!(
            answer.render(),
            "Aspirin reduces fever.\n\n---\nSources:\n- aspirin.pdf\n- drugs.txt"
        );
    }

    #[test]
    fn test_render_without_citations_is_bare_text() {
        let answer = Answer {
            text: "Plain answer.".to_string(),
            citations: vec![],
        };
        assert_eq!(answer.render(), "Plain answer.");
    }
}
