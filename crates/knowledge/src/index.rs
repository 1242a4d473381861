//! SQLite-backed vector index.
//!
//! Embeddings are stored as little-endian f32 blobs alongside the chunk
//! text; similarity is computed in-process at query time. That keeps the
//! index a single file with no server, which is plenty for the corpus
//! sizes this tool targets.

use crate::embeddings::EmbedderFingerprint;
use crate::types::{Chunk, IndexStats, IndexedChunk, RetrievedChunk};
use crate::vector_index::VectorIndex;
use chrono::Utc;
use medquery_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Meta key under which the embedder fingerprint is stored as JSON.
const META_FINGERPRINT: &str = "embedder_fingerprint";

/// SQLite-backed chunk index.
pub struct SqliteIndex {
    conn: Connection,
}

impl SqliteIndex {
    /// Open (creating if needed) the index at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Index(format!("Failed to create index directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                key TEXT PRIMARY KEY,
                source_id TEXT NOT NULL,
                start INTEGER NOT NULL,
                text TEXT NOT NULL,
                hash TEXT NOT NULL,
                embedding BLOB NOT NULL,
                indexed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source_id);

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Ok(Self { conn })
    }

    /// In-memory index for tests.
    #[cfg(test)]
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Index(format!("Failed to open in-memory index: {}", e)))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                key TEXT PRIMARY KEY,
                source_id TEXT NOT NULL,
                start INTEGER NOT NULL,
                text TEXT NOT NULL,
                hash TEXT NOT NULL,
                embedding BLOB NOT NULL,
                indexed_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source_id);
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))?;
        Ok(Self { conn })
    }
}

impl VectorIndex for SqliteIndex {
    fn upsert(&mut self, chunk: &IndexedChunk) -> AppResult<()> {
        let embedding_bytes = embedding_to_bytes(&chunk.embedding);

        self.conn
            .execute(
                "INSERT OR REPLACE INTO chunks (key, source_id, start, text, hash, embedding, indexed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    chunk.chunk.key(),
                    chunk.chunk.source_id,
                    chunk.chunk.start as i64,
                    chunk.chunk.text,
                    chunk.chunk.hash,
                    embedding_bytes,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| AppError::Index(format!("Failed to upsert chunk: {}", e)))?;

        Ok(())
    }

    fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<RetrievedChunk>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, source_id, start, text, hash, embedding FROM chunks")
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let embedding_bytes: Vec<u8> = row.get(5)?;
                let embedding = bytes_to_embedding(&embedding_bytes)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

                Ok((
                    row.get::<_, String>(0)?,
                    Chunk {
                        source_id: row.get(1)?,
                        start: row.get::<_, i64>(2)? as usize,
                        text: row.get(3)?,
                        hash: row.get(4)?,
                    },
                    embedding,
                ))
            })
            .map_err(|e| AppError::Index(format!("Failed to query chunks: {}", e)))?;

        let mut results: Vec<(String, RetrievedChunk)> = Vec::new();
        for row in rows {
            let (key, chunk, embedding) =
                row.map_err(|e| AppError::Index(format!("Failed to read chunk row: {}", e)))?;
            let score = cosine_similarity(query, &embedding);
            results.push((key, RetrievedChunk { chunk, score }));
        }

        // Score descending, key ascending on ties: stable across runs
        results.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        results.truncate(top_k);

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results.into_iter().map(|(_, r)| r).collect())
    }

    fn stats(&self) -> AppResult<IndexStats> {
        let sources_count: u32 = self
            .conn
            .query_row("SELECT COUNT(DISTINCT source_id) FROM chunks", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u32)
            })
            .map_err(|e| AppError::Index(format!("Failed to count sources: {}", e)))?;

        let chunks_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u32)
            })
            .map_err(|e| AppError::Index(format!("Failed to count chunks: {}", e)))?;

        Ok(IndexStats {
            sources_count,
            chunks_count,
        })
    }

    fn reset(&mut self) -> AppResult<()> {
        self.conn
            .execute("DELETE FROM chunks", [])
            .map_err(|e| AppError::Index(format!("Failed to delete chunks: {}", e)))?;
        self.conn
            .execute("DELETE FROM meta", [])
            .map_err(|e| AppError::Index(format!("Failed to delete meta: {}", e)))?;

        tracing::info!("Reset vector index");
        Ok(())
    }

    fn fingerprint(&self) -> AppResult<Option<EmbedderFingerprint>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                params![META_FINGERPRINT],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::Index(format!("Failed to read fingerprint: {}", e)))?;

        match value {
            Some(json) => {
                let fingerprint = serde_json::from_str(&json).map_err(|e| {
                    AppError::Index(format!("Corrupt embedder fingerprint in index: {}", e))
                })?;
                Ok(Some(fingerprint))
            }
            None => Ok(None),
        }
    }

    fn set_fingerprint(&mut self, fingerprint: &EmbedderFingerprint) -> AppResult<()> {
        let json = serde_json::to_string(fingerprint)
            .map_err(|e| AppError::Index(format!("Failed to serialize fingerprint: {}", e)))?;

        self.conn
            .execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
                params![META_FINGERPRINT, json],
            )
            .map_err(|e| AppError::Index(format!("Failed to record fingerprint: {}", e)))?;

        Ok(())
    }
}

/// Convert an embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index("Invalid embedding bytes length".to_string()));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        embedding.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(embedding)
}

/// Cosine similarity between two vectors; 0.0 on mismatch or zero norm.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
