//! Answer synthesis from retrieved chunks.

use crate::rag::types::Answer;
use crate::types::RetrievedChunk;
use medquery_core::AppResult;
use medquery_llm::{GenerationRequest, Generator};
use medquery_prompt::{build_answer_prompt, NO_MATCH_PHRASE};
use std::collections::BTreeSet;

/// Minimum cosine similarity for a chunk to count as relevant context.
/// Chunks below this line are noise; an off-topic question typically
/// leaves nothing above it.
pub const MIN_RELEVANCE_SCORE: f32 = 0.20;

/// Separator between chunk excerpts in the assembled context.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Generation temperature. Low, because the answer must stick to context.
const TEMPERATURE: f32 = 0.3;

/// Generation token cap.
const MAX_TOKENS: u32 = 1000;

/// Synthesize a grounded answer from retrieved chunks.
///
/// With no retrieved chunks at all (empty index) the fixed refusal is
/// returned without calling the generator. Otherwise chunks below
/// [`MIN_RELEVANCE_SCORE`] are dropped, the survivors are assembled into
/// a bounded context, and the generator answers against it. Citations
/// list the source documents of the context chunks, deduplicated and
/// sorted, and are withheld when the answer itself says nothing was found.
pub async fn synthesize(
    question: &str,
    retrieved: &[RetrievedChunk],
    generator: &dyn Generator,
    model: &str,
    max_context_chars: usize,
) -> AppResult<Answer> {
    if retrieved.is_empty() {
        tracing::debug!("No chunks retrieved; answering with the fixed refusal");
        return Ok(Answer::refusal());
    }

    let relevant: Vec<&RetrievedChunk> = retrieved
        .iter()
        .filter(|r| r.score >= MIN_RELEVANCE_SCORE)
        .collect();

    tracing::debug!(
        "{} of {} retrieved chunks above relevance cutoff {}",
        relevant.len(),
        retrieved.len(),
        MIN_RELEVANCE_SCORE
    );

    let (context, cited_chunks) = assemble_context(&relevant, max_context_chars);

    let prompt = build_answer_prompt(question, &context, cited_chunks.len())?;

    let request = GenerationRequest::new(&prompt.user, model)
        .with_system(&prompt.system)
        .with_temperature(TEMPERATURE)
        .with_max_tokens(MAX_TOKENS);

    let response = generator.generate(&request).await?;

    let text = response.content.trim().to_string();

    // No citations when nothing relevant went in, or when the model
    // itself declared a no-match
    let citations = if cited_chunks.is_empty() || text.contains(NO_MATCH_PHRASE) {
        vec![]
    } else {
        cited_chunks
            .iter()
            .map(|r| r.chunk.source_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    };

    Ok(Answer { text, citations })
}

/// Join relevant chunks into a context block capped at `max_context_chars`,
/// at chunk granularity. The first chunk is always included so a single
/// oversized chunk cannot starve the prompt of context.
fn assemble_context<'a>(
    relevant: &[&'a RetrievedChunk],
    max_context_chars: usize,
) -> (String, Vec<&'a RetrievedChunk>) {
    let mut context = String::new();
    let mut included = Vec::new();

    for retrieved in relevant {
        let added_len = if context.is_empty() {
            retrieved.chunk.text.len()
        } else {
            CONTEXT_SEPARATOR.len() + retrieved.chunk.text.len()
        };

        if !included.is_empty() && context.len() + added_len > max_context_chars {
            break;
        }

        if !context.is_empty() {
            context.push_str(CONTEXT_SEPARATOR);
        }
        context.push_str(&retrieved.chunk.text);
        included.push(*retrieved);
    }

    (context, included)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;
    use medquery_core::AppResult;
    use medquery_llm::{GenerationResponse, GenerationUsage};
    use medquery_prompt::REFUSAL_TEXT;
    use std::sync::Mutex;

    /// Generator returning a fixed response and recording the last request.
    #[derive(Debug)]
    struct ScriptedGenerator {
        response: String,
        last_request: Mutex<Option<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                last_request: Mutex::new(None),
            }
        }

        fn last_prompt(&self) -> Option<String> {
            self.last_request
                .lock()
                .unwrap()
                .as_ref()
                .map(|r| r.prompt.clone())
        }
    }

    #[async_trait::async_trait]
    impl Generator for ScriptedGenerator {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationResponse> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(GenerationResponse {
                content: self.response.clone(),
                model: request.model.clone(),
                usage: GenerationUsage::new(10, 10),
            })
        }
    }

    fn retrieved(source_id: &str, start: usize, text: &str, score: f32) -> RetrievedChunk {
        RetrievedChunk {
            chunk: Chunk {
                source_id: source_id.to_string(),
                start,
                text: text.to_string(),
                hash: "h".to_string(),
            },
            score,
        }
    }

    #[tokio::test]
    async fn test_empty_retrieval_short_circuits_to_refusal() {
        let generator = ScriptedGenerator::new("should never be called");

        let answer = synthesize("What is aspirin?", &[], &generator, "m", 6000)
            .await
            .unwrap();

        assert_eq!(answer.text, REFUSAL_TEXT);
        assert!(answer.citations.is_empty());
        assert!(generator.last_prompt().is_none());
    }

    #[tokio::test]
    async fn test_citations_deduplicated_and_sorted() {
        let generator = ScriptedGenerator::new("Aspirin reduces fever.");
        let chunks = vec![
            retrieved("B.pdf", 0, "aspirin text one", 0.9),
            retrieved("A.pdf", 0, "aspirin text two", 0.8),
            retrieved("B.pdf", 100, "aspirin text three", 0.7),
        ];

        let answer = synthesize("aspirin?", &chunks, &generator, "m", 6000)
            .await
            .unwrap();

        assert_eq!(answer.citations, vec!["A.pdf", "B.pdf"]);
        assert_eq!(
            answer.render(),
            "Aspirin reduces fever.\n\n---\nSources:\n- A.pdf\n- B.pdf"
        );
    }

    #[tokio::test]
    async fn test_no_match_answer_is_uncited() {
        let generator = ScriptedGenerator::new(REFUSAL_TEXT);
        let chunks = vec![retrieved("A.pdf", 0, "some text", 0.5)];

        let answer = synthesize("question?", &chunks, &generator, "m", 6000)
            .await
            .unwrap();

        assert!(answer.is_refusal());
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn test_low_scoring_chunks_are_uncited() {
        let generator =
            ScriptedGenerator::new("That's outside what I can help with; try a drug question.");
        let chunks = vec![
            retrieved("A.pdf", 0, "irrelevant text", 0.05),
            retrieved("B.pdf", 0, "also irrelevant", 0.10),
        ];

        let answer = synthesize("weather tomorrow?", &chunks, &generator, "m", 6000)
            .await
            .unwrap();

        assert!(answer.citations.is_empty());
        // The generator still runs, with the empty-context note in place
        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("no relevant excerpts"));
    }

    #[tokio::test]
    async fn test_context_contains_relevant_chunks_only() {
        let generator = ScriptedGenerator::new("Answer.");
        let chunks = vec![
            retrieved("A.pdf", 0, "RELEVANT-ONE", 0.9),
            retrieved("A.pdf", 100, "IRRELEVANT-LOW", 0.1),
            retrieved("B.pdf", 0, "RELEVANT-TWO", 0.4),
        ];

        let answer = synthesize("question?", &chunks, &generator, "m", 6000)
            .await
            .unwrap();

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("RELEVANT-ONE"));
        assert!(prompt.contains("RELEVANT-TWO"));
        assert!(!prompt.contains("IRRELEVANT-LOW"));
        assert_eq!(answer.citations, vec!["A.pdf", "B.pdf"]);
    }

    #[tokio::test]
    async fn test_context_cap_limits_chunks_and_citations() {
        let generator = ScriptedGenerator::new("Answer.");
        let big = "x".repeat(400);
        let chunks = vec![
            retrieved("A.pdf", 0, &big, 0.9),
            retrieved("B.pdf", 0, &big, 0.8),
            retrieved("C.pdf", 0, &big, 0.7),
        ];

        // Cap fits roughly two chunks plus a separator
        let answer = synthesize("question?", &chunks, &generator, "m", 900)
            .await
            .unwrap();

        assert_eq!(answer.citations, vec!["A.pdf", "B.pdf"]);
    }

    #[tokio::test]
    async fn test_oversized_first_chunk_still_included() {
        let generator = ScriptedGenerator::new("Answer.");
        let big = "y".repeat(5000);
        let chunks = vec![retrieved("A.pdf", 0, &big, 0.9)];

        let answer = synthesize("question?", &chunks, &generator, "m", 1000)
            .await
            .unwrap();

        assert_eq!(answer.citations, vec!["A.pdf"]);
    }
}
