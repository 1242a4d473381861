//! Vector index abstraction.

use crate::embeddings::EmbedderFingerprint;
use crate::types::{IndexStats, IndexedChunk, RetrievedChunk};
use medquery_core::AppResult;

/// Trait for vector indexes.
///
/// An index stores embedded chunks keyed by [`Chunk::key`](crate::types::Chunk::key)
/// and answers nearest-neighbor queries by cosine similarity. Upserting an
/// existing key replaces the stored chunk, which is what makes a full
/// re-ingestion of an unchanged corpus idempotent.
pub trait VectorIndex: Send {
    /// Insert or replace a chunk by its deterministic key.
    fn upsert(&mut self, chunk: &IndexedChunk) -> AppResult<()>;

    /// Return the `top_k` most similar chunks, best first. Ties on score
    /// break by chunk key so results are stable across runs.
    fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<RetrievedChunk>>;

    /// Source and chunk counts.
    fn stats(&self) -> AppResult<IndexStats>;

    /// Remove all indexed chunks and the recorded fingerprint.
    fn reset(&mut self) -> AppResult<()>;

    /// Fingerprint of the embedder that populated this index, if any.
    fn fingerprint(&self) -> AppResult<Option<EmbedderFingerprint>>;

    /// Record the embedder fingerprint.
    fn set_fingerprint(&mut self, fingerprint: &EmbedderFingerprint) -> AppResult<()>;
}
