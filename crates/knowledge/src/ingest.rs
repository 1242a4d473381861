//! Corpus ingestion: load, chunk, embed, upsert.

use crate::chunker::{self, ChunkConfig};
use crate::document::{self, ContentType};
use crate::embeddings::{EmbedderFingerprint, EmbeddingProvider};
use crate::types::{IndexedChunk, IngestStats};
use crate::vector_index::VectorIndex;
use medquery_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Ingest a corpus file or directory into the index.
///
/// Documents are processed one at a time and the first failure aborts the
/// run, naming the offending document; chunks already upserted stay in the
/// index and a rerun redoes them idempotently. With `reset` the index is
/// emptied first, which is also the way to switch embedders.
pub async fn ingest_corpus(
    corpus: &Path,
    embedder: &dyn EmbeddingProvider,
    index: &mut dyn VectorIndex,
    chunk_config: &ChunkConfig,
    reset: bool,
) -> AppResult<IngestStats> {
    let started = Instant::now();

    if reset {
        index.reset()?;
    }

    let active = EmbedderFingerprint::of(embedder);
    if let Some(stored) = index.fingerprint()? {
        if stored != active {
            return Err(AppError::Embedding(format!(
                "Index was built with embedder {} but the active embedder is {}. \
                 Re-ingest with --reset to switch embedders.",
                stored, active
            )));
        }
    }

    let files = collect_corpus_files(corpus)?;
    tracing::info!("Ingesting {} documents from {:?}", files.len(), corpus);

    let mut stats = IngestStats {
        documents_loaded: 0,
        chunks_produced: 0,
        chunks_indexed: 0,
        bytes_processed: 0,
        duration_secs: 0.0,
    };

    for path in &files {
        let doc = document::load_document(path)?;
        stats.documents_loaded += 1;
        stats.bytes_processed += doc.text.len() as u64;

        let chunks = chunker::split(&doc, chunk_config);
        stats.chunks_produced += chunks.len() as u32;

        if chunks.is_empty() {
            tracing::warn!("Document '{}' produced no chunks, skipping", doc.source_id);
            continue;
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await.map_err(|e| {
            AppError::Embedding(format!("Failed to embed '{}': {}", doc.source_id, e))
        })?;

        if embeddings.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "Embedder returned {} vectors for {} chunks of '{}'",
                embeddings.len(),
                chunks.len(),
                doc.source_id
            )));
        }

        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            index
                .upsert(&IndexedChunk { chunk, embedding })
                .map_err(|e| {
                    AppError::Index(format!("Failed to index '{}': {}", doc.source_id, e))
                })?;
            stats.chunks_indexed += 1;
        }

        tracing::debug!("Indexed document '{}'", doc.source_id);
    }

    index.set_fingerprint(&active)?;

    stats.duration_secs = started.elapsed().as_secs_f64();
    tracing::info!(
        "Ingestion complete: {} documents, {} chunks in {:.2}s",
        stats.documents_loaded,
        stats.chunks_indexed,
        stats.duration_secs
    );

    Ok(stats)
}

/// Collect the supported document files under `corpus`, sorted for a
/// deterministic processing order. Hidden entries and unsupported types
/// are skipped; finding nothing ingestible is an error.
fn collect_corpus_files(corpus: &Path) -> AppResult<Vec<PathBuf>> {
    if !corpus.exists() {
        return Err(AppError::Load(format!(
            "Corpus path does not exist: {:?}",
            corpus
        )));
    }

    let mut files = Vec::new();

    if corpus.is_file() {
        if !ContentType::from_path(corpus).is_supported() {
            return Err(AppError::Load(format!(
                "Unsupported document type: {:?}",
                corpus
            )));
        }
        files.push(corpus.to_path_buf());
    } else {
        for entry in WalkDir::new(corpus)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry =
                entry.map_err(|e| AppError::Load(format!("Failed to walk corpus: {}", e)))?;
            if entry.file_type().is_file() && ContentType::from_path(entry.path()).is_supported() {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();

    if files.is_empty() {
        return Err(AppError::Load(format!(
            "No supported documents (pdf, md, txt) found in {:?}",
            corpus
        )));
    }

    Ok(files)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::mock::MockEmbedder;
    use crate::index::SqliteIndex;
    use tempfile::TempDir;

    fn write_corpus(temp: &TempDir) -> PathBuf {
        let dir = temp.path().join("docs");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("aspirin.txt"),
            "Aspirin reduces fever and relieves mild pain.",
        )
        .unwrap();
        std::fs::write(
            dir.join("ibuprofen.md"),
            "Ibuprofen is an anti-inflammatory drug.",
        )
        .unwrap();
        std::fs::write(dir.join("notes.bin"), "not a document").unwrap();
        std::fs::write(dir.join(".hidden.txt"), "ignored").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_ingest_directory() {
        let temp = TempDir::new().unwrap();
        let corpus = write_corpus(&temp);
        let embedder = MockEmbedder::new(64);
        let mut index = SqliteIndex::open_in_memory().unwrap();

        let stats = ingest_corpus(&corpus, &embedder, &mut index, &ChunkConfig::default(), false)
            .await
            .unwrap();

        assert_eq!(stats.documents_loaded, 2);
        assert_eq!(stats.chunks_produced, 2);
        assert_eq!(stats.chunks_indexed, 2);
        assert!(stats.bytes_processed > 0);

        let index_stats = index.stats().unwrap();
        assert_eq!(index_stats.sources_count, 2);
    }

    #[tokio::test]
    async fn test_ingest_single_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("drug.txt");
        std::fs::write(&path, "Paracetamol treats headaches.").unwrap();

        let embedder = MockEmbedder::new(64);
        let mut index = SqliteIndex::open_in_memory().unwrap();

        let stats = ingest_corpus(&path, &embedder, &mut index, &ChunkConfig::default(), false)
            .await
            .unwrap();

        assert_eq!(stats.documents_loaded, 1);
        assert_eq!(index.stats().unwrap().chunks_count, 1);
    }

    #[tokio::test]
    async fn test_ingest_records_fingerprint() {
        let temp = TempDir::new().unwrap();
        let corpus = write_corpus(&temp);
        let embedder = MockEmbedder::new(64);
        let mut index = SqliteIndex::open_in_memory().unwrap();

        ingest_corpus(&corpus, &embedder, &mut index, &ChunkConfig::default(), false)
            .await
            .unwrap();

        let fingerprint = index.fingerprint().unwrap().unwrap();
        assert_eq!(fingerprint.provider, "mock");
        assert_eq!(fingerprint.dimensions, 64);
    }

    #[tokio::test]
    async fn test_reingest_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let corpus = write_corpus(&temp);
        let embedder = MockEmbedder::new(64);
        let mut index = SqliteIndex::open_in_memory().unwrap();
        let config = ChunkConfig::default();

        ingest_corpus(&corpus, &embedder, &mut index, &config, false)
            .await
            .unwrap();
        let first = index.stats().unwrap();

        ingest_corpus(&corpus, &embedder, &mut index, &config, false)
            .await
            .unwrap();
        let second = index.stats().unwrap();

        assert_eq!(first.chunks_count, second.chunks_count);
        assert_eq!(first.sources_count, second.sources_count);
    }

    #[tokio::test]
    async fn test_embedder_mismatch_is_rejected() {
        let temp = TempDir::new().unwrap();
        let corpus = write_corpus(&temp);
        let mut index = SqliteIndex::open_in_memory().unwrap();
        let config = ChunkConfig::default();

        ingest_corpus(&corpus, &MockEmbedder::new(64), &mut index, &config, false)
            .await
            .unwrap();

        let result =
            ingest_corpus(&corpus, &MockEmbedder::new(128), &mut index, &config, false).await;
        match result {
            Err(AppError::Embedding(msg)) => assert!(msg.contains("--reset")),
            other => panic!("Expected Embedding error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reset_allows_embedder_switch() {
        let temp = TempDir::new().unwrap();
        let corpus = write_corpus(&temp);
        let mut index = SqliteIndex::open_in_memory().unwrap();
        let config = ChunkConfig::default();

        ingest_corpus(&corpus, &MockEmbedder::new(64), &mut index, &config, false)
            .await
            .unwrap();
        ingest_corpus(&corpus, &MockEmbedder::new(128), &mut index, &config, true)
            .await
            .unwrap();

        let fingerprint = index.fingerprint().unwrap().unwrap();
        assert_eq!(fingerprint.dimensions, 128);
    }

    #[tokio::test]
    async fn test_empty_corpus_is_load_error() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty");
        std::fs::create_dir_all(&empty).unwrap();

        let embedder = MockEmbedder::new(64);
        let mut index = SqliteIndex::open_in_memory().unwrap();

        let result = ingest_corpus(
            &empty,
            &embedder,
            &mut index,
            &ChunkConfig::default(),
            false,
        )
        .await;
        assert!(matches!(result, Err(AppError::Load(_))));
    }

    #[tokio::test]
    async fn test_missing_corpus_is_load_error() {
        let embedder = MockEmbedder::new(64);
        let mut index = SqliteIndex::open_in_memory().unwrap();

        let result = ingest_corpus(
            Path::new("/nonexistent/corpus"),
            &embedder,
            &mut index,
            &ChunkConfig::default(),
            false,
        )
        .await;
        assert!(matches!(result, Err(AppError::Load(_))));
    }

    #[test]
    fn test_collect_skips_hidden_and_unsupported() {
        let temp = TempDir::new().unwrap();
        let corpus = write_corpus(&temp);

        let files = collect_corpus_files(&corpus).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| {
            let name = f.file_name().unwrap().to_string_lossy();
            !name.starts_with('.') && !name.ends_with(".bin")
        }));
    }
}
