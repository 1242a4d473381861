//! Knowledge system for medquery.
//!
//! Owns both halves of the document question-answering pipeline:
//! - Ingestion: load documents, chunk, embed, upsert into the vector index
//! - Serving: embed the query, retrieve similar chunks, synthesize a
//!   grounded answer with citations
//!
//! The index lives in `.medquery/index.sqlite` inside the workspace.

pub mod chunker;
pub mod document;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod rag;
pub mod retriever;
pub mod services;
pub mod types;
pub mod vector_index;

pub use embeddings::{create_embedder, EmbedderFingerprint, EmbeddingProvider};
pub use rag::Answer;
pub use services::Services;
pub use types::{Chunk, Document, IndexStats, IngestStats, RetrievedChunk};
pub use vector_index::VectorIndex;

use chunker::ChunkConfig;
use index::SqliteIndex;
use medquery_core::{AppConfig, AppResult};
use std::path::Path;

/// Ingest a corpus into the workspace index.
pub async fn ingest_into_workspace(
    config: &AppConfig,
    services: &Services,
    corpus: &Path,
    reset: bool,
) -> AppResult<IngestStats> {
    let mut index = SqliteIndex::open(&config.index_path())?;
    let chunk_config = ChunkConfig::new(config.chunk_size, config.chunk_overlap);

    ingest::ingest_corpus(
        corpus,
        services.embedder.as_ref(),
        &mut index,
        &chunk_config,
        reset,
    )
    .await
}

/// Answer a question against the workspace index.
pub async fn answer_from_workspace(
    config: &AppConfig,
    services: &Services,
    question: &str,
) -> AppResult<Answer> {
    let index = SqliteIndex::open(&config.index_path())?;

    let retrieved = retriever::retrieve(
        question,
        services.embedder.as_ref(),
        &index,
        config.top_k,
    )
    .await?;

    rag::synthesize(
        question,
        &retrieved,
        services.generator.as_ref(),
        &config.model,
        config.max_context_chars,
    )
    .await
}

/// Stats for the workspace index.
pub fn workspace_index_stats(config: &AppConfig) -> AppResult<IndexStats> {
    let index = SqliteIndex::open(&config.index_path())?;
    index.stats()
}

#[cfg(test)]
mod tests;
