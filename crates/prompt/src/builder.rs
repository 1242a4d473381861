//! Prompt builder for the grounded answering template.
//!
//! Renders the fixed instruction template with the retrieved context and
//! the user question via Handlebars.

use crate::types::{AssembledPrompt, EMPTY_CONTEXT_NOTE, REFUSAL_TEXT};
use handlebars::Handlebars;
use medquery_core::{AppError, AppResult};
use std::collections::HashMap;

/// System template carrying the three behavioral rules.
///
/// Rule 2 embeds the refusal sentence verbatim so that downstream substring
/// matching can detect a no-match answer.
const SYSTEM_TEMPLATE: &str = "\
You are a careful assistant answering questions about a fixed collection of documents.

Rules:
1. Answer ONLY from the excerpts in the Context section. Never use outside \
knowledge, even when you are confident you know the answer.
2. If the Context contains nothing relevant to the question, reply exactly: \
\"{{refusal}}\"
3. If the question is unrelated to the document collection (a greeting, small \
talk, or an off-topic subject), ignore the Context, respond politely, and \
redirect the user back to the documents.

Keep answers concise and factual. Do not mention excerpts, chunks, or \
retrieval; answer as if you had read the documents directly.";

/// User template combining context and question.
const USER_TEMPLATE: &str = "\
Context:
{{context}}

Question:
{{question}}";

/// Assemble the grounded answering prompt for a query.
///
/// `context_block` is the bounded concatenation of retrieved excerpts; when
/// it is empty (nothing relevant was retrieved) a placeholder note is
/// substituted so that rule 2 and rule 3 still have a well-defined Context
/// section to act on.
pub fn build_answer_prompt(
    question: &str,
    context_block: &str,
    chunk_count: usize,
) -> AppResult<AssembledPrompt> {
    let context = if context_block.trim().is_empty() {
        EMPTY_CONTEXT_NOTE
    } else {
        context_block
    };

    let mut variables = HashMap::new();
    variables.insert("question".to_string(), question.to_string());
    variables.insert("context".to_string(), context.to_string());
    variables.insert("refusal".to_string(), REFUSAL_TEXT.to_string());

    let system = render_template(SYSTEM_TEMPLATE, &variables)?;
    let user = render_template(USER_TEMPLATE, &variables)?;

    tracing::debug!(
        "Assembled prompt: {} context chars, {} excerpts",
        context.len(),
        chunk_count
    );

    Ok(AssembledPrompt {
        system,
        user,
        chunk_count,
        context_chars: context.len(),
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
