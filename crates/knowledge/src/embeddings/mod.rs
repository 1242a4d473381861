//! Embedding providers for the knowledge system.
//!
//! An embedder turns chunk and query text into fixed-dimension vectors.
//! Every vector in an index must come from the same embedder; the
//! [`EmbedderFingerprint`] recorded at ingestion lets retrieval reject a
//! mismatched index instead of silently comparing incompatible vectors.

pub mod provider;
pub mod providers;

pub use provider::{create_embedder, EmbeddingProvider};

use serde::{Deserialize, Serialize};

/// Identity of the embedder that produced an index's vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedderFingerprint {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
}

impl EmbedderFingerprint {
    /// Fingerprint of a live embedder.
    pub fn of(embedder: &dyn EmbeddingProvider) -> Self {
        Self {
            provider: embedder.provider_name().to_string(),
            model: embedder.model_name().to_string(),
            dimensions: embedder.dimensions(),
        }
    }
}

impl std::fmt::Display for EmbedderFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({}d)", self.provider, self.model, self.dimensions)
    }
}
