//! Document chunking with bounded size and fixed overlap.
//!
//! Splitting is window-based with separator snapping: each chunk covers a
//! contiguous byte range of the document, the end of a chunk prefers the
//! coarsest separator (paragraph break, line break, sentence boundary,
//! whitespace) found inside the size window, and the next chunk starts a
//! fixed overlap before the previous end. Because chunks are contiguous
//! ranges, reassembling them minus their overlaps reproduces the document
//! text exactly.

use crate::types::{Chunk, Document};
use sha2::{Digest, Sha256};

/// Separator candidates, coarsest first. A chunk boundary snaps to the last
/// occurrence of the coarsest separator that still leaves a reasonably sized
/// chunk; a window with no usable separator is cut at the size bound.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Chunking configuration.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum chunk size in bytes (separator snapping keeps chunks at or
    /// under this bound)
    pub max_chars: usize,

    /// Overlap between consecutive chunks in bytes
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap: 100,
        }
    }
}

impl ChunkConfig {
    /// Create a config with explicit geometry.
    pub fn new(max_chars: usize, overlap: usize) -> Self {
        Self { max_chars, overlap }
    }
}

/// Split a document into overlapping chunks.
///
/// Pure function of its input: repeated calls yield identical output.
/// A document shorter than the chunk size yields exactly one chunk; an
/// empty document yields none.
pub fn split(document: &Document, config: &ChunkConfig) -> Vec<Chunk> {
    let text = document.text.as_str();
    if text.is_empty() {
        return vec![];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let hard_end = floor_char_boundary(text, (start + config.max_chars).min(text.len()));

        let end = if hard_end == text.len() {
            hard_end
        } else {
            snap_to_separator(text, start, hard_end)
        };

        let chunk_text = &text[start..end];
        chunks.push(Chunk {
            source_id: document.source_id.clone(),
            start,
            text: chunk_text.to_string(),
            hash: content_hash(chunk_text),
        });

        if end == text.len() {
            break;
        }

        let mut next = floor_char_boundary(text, end.saturating_sub(config.overlap));
        if next <= start {
            // Forward progress even with a degenerate geometry.
            next = end;
        }
        start = next;
    }

    tracing::debug!(
        "Chunked '{}' into {} chunks (max: {}, overlap: {})",
        document.source_id,
        chunks.len(),
        config.max_chars,
        config.overlap
    );

    chunks
}

/// Find the chunk end inside `[start, hard_end)`, preferring the coarsest
/// separator whose cut keeps at least half the window. Falls back to the
/// hard bound when no separator qualifies (e.g. one oversized token).
fn snap_to_separator(text: &str, start: usize, hard_end: usize) -> usize {
    let window = &text[start..hard_end];
    let min_keep = window.len() / 2;

    for sep in SEPARATORS {
        if let Some(pos) = window.rfind(sep) {
            let cut = pos + sep.len();
            if cut >= min_keep {
                return start + cut;
            }
        }
    }

    hard_end
}

/// Largest char boundary at or below `index`.
#[inline]
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// SHA-256 hex digest of chunk text.
fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}
