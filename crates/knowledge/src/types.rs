//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// A source document loaded from the corpus.
///
/// Immutable once loaded; consumed only by the chunker.
#[derive(Debug, Clone)]
pub struct Document {
    /// Stable source identifier (file name)
    pub source_id: String,

    /// Full document text (pages joined with newlines)
    pub text: String,

    /// Ordered page texts
    pub pages: Vec<String>,
}

/// A bounded, overlapping substring of a source document — the unit of
/// retrieval.
///
/// A chunk has no identity beyond `(source_id, start)`; the deterministic
/// [`Chunk::key`] derived from that pair makes re-ingestion idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Source document identifier
    pub source_id: String,

    /// Byte offset of this chunk within the document text
    pub start: usize,

    /// Chunk text content (bounded length)
    pub text: String,

    /// SHA-256 hash of the chunk text
    pub hash: String,
}

impl Chunk {
    /// Deterministic upsert key: document id + chunk offset.
    pub fn key(&self) -> String {
        format!("{}:{}", self.source_id, self.start)
    }
}

/// A chunk paired with its embedding, ready for upsert.
///
/// Owned by the vector index once upserted; never mutated, only replaced
/// when an identical key is re-ingested.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A chunk returned by retrieval, paired with its similarity score.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of documents loaded
    pub documents_loaded: u32,

    /// Number of chunks produced by the chunker
    pub chunks_produced: u32,

    /// Number of chunks upserted into the index
    pub chunks_indexed: u32,

    /// Total bytes of document text processed
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Statistics for the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of distinct source documents
    pub sources_count: u32,

    /// Number of indexed chunks
    pub chunks_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_key_is_deterministic() {
        let chunk = Chunk {
            source_id: "drugs.pdf".to_string(),
            start: 900,
            text: "text".to_string(),
            hash: "abc".to_string(),
        };

        assert_eq!(chunk.key(), "drugs.pdf:900");
        assert_eq!(chunk.key(), chunk.key());
    }
}
