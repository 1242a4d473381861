//! Query-time retrieval over the vector index.

use crate::embeddings::{EmbedderFingerprint, EmbeddingProvider};
use crate::types::RetrievedChunk;
use crate::vector_index::VectorIndex;
use medquery_core::{AppError, AppResult};

/// Retrieve the `top_k` chunks most similar to `query`.
///
/// The index fingerprint is checked against the active embedder before
/// embedding the query; an index built with a different embedder is
/// rejected rather than searched with incompatible vectors. An index with
/// no fingerprint (never ingested) yields an empty result.
pub async fn retrieve(
    query: &str,
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    top_k: usize,
) -> AppResult<Vec<RetrievedChunk>> {
    let stored = match index.fingerprint()? {
        Some(fingerprint) => fingerprint,
        None => {
            tracing::debug!("Index has no fingerprint (empty); nothing to retrieve");
            return Ok(vec![]);
        }
    };

    let active = EmbedderFingerprint::of(embedder);
    if stored != active {
        return Err(AppError::Embedding(format!(
            "Index was built with embedder {} but the active embedder is {}. \
             Re-ingest with --reset to switch embedders.",
            stored, active
        )));
    }

    let query_embedding = embedder.embed(query).await?;
    let results = index.search(&query_embedding, top_k)?;

    tracing::debug!(
        "Retrieved {} chunks for query ({} chars)",
        results.len(),
        query.len()
    );

    Ok(results)
}
