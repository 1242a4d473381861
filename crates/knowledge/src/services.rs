//! Shared service handles.

use crate::embeddings::{create_embedder, EmbeddingProvider};
use medquery_core::{AppConfig, AppError, AppResult};
use medquery_llm::{create_generator, Generator};
use std::sync::Arc;

/// Provider handles shared across the process.
///
/// Built once at startup from configuration and cloned cheaply wherever a
/// command needs them; both handles are safe for concurrent use.
#[derive(Clone)]
pub struct Services {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: Arc<dyn Generator>,
}

impl Services {
    /// Construct service handles from configuration.
    pub fn init(config: &AppConfig) -> AppResult<Self> {
        let embedder = create_embedder(
            &config.embedding_provider,
            &config.embedding_model,
            config.embedding_dimensions,
            config.endpoint.as_deref(),
        )?;

        let generator = create_generator(&config.provider, config.endpoint.as_deref())
            .map_err(AppError::Config)?;

        tracing::debug!(
            "Services ready: embedder {}/{}, generator {}",
            embedder.provider_name(),
            embedder.model_name(),
            generator.provider_name()
        );

        Ok(Self {
            embedder,
            generator,
        })
    }

    /// Construct from explicit handles (used by tests).
    pub fn from_parts(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            embedder,
            generator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_mock_embedder() {
        let config = AppConfig {
            embedding_provider: "mock".to_string(),
            ..Default::default()
        };

        let services = Services::init(&config).unwrap();
        assert_eq!(services.embedder.provider_name(), "mock");
        assert_eq!(services.generator.provider_name(), "ollama");
    }

    #[test]
    fn test_init_rejects_unknown_generator() {
        let config = AppConfig {
            provider: "nope".to_string(),
            embedding_provider: "mock".to_string(),
            ..Default::default()
        };

        assert!(Services::init(&config).is_err());
    }
}
