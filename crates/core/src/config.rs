//! Configuration management for medquery.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.medquery/config.yaml)
//!
//! The configuration is workspace-centric, with the index and all derived
//! state stored under `.medquery/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// Holds the settings shared by both pipelines: the generator and embedder
/// identities, chunking geometry, and retrieval parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .medquery/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generator provider (e.g., "ollama")
    pub provider: String,

    /// Generator model identifier
    pub model: String,

    /// Optional custom endpoint for the generator provider
    pub endpoint: Option<String>,

    /// Embedding provider ("ollama" or "mock")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Embedding vector dimension
    pub embedding_dimensions: usize,

    /// Maximum chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Number of chunks to retrieve per query
    pub top_k: usize,

    /// Upper bound on the assembled context block, in characters
    pub max_context_chars: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure (.medquery/config.yaml).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    generator: Option<GeneratorConfig>,
    embedding: Option<EmbeddingSection>,
    chunking: Option<ChunkingSection>,
    retrieval: Option<RetrievalSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeneratorConfig {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkingSection {
    #[serde(rename = "chunkSize")]
    chunk_size: Option<usize>,
    #[serde(rename = "chunkOverlap")]
    chunk_overlap: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    #[serde(rename = "maxContextChars")]
    max_context_chars: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            embedding_provider: "ollama".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dimensions: 768,
            chunk_size: 1000,
            chunk_overlap: 100,
            top_k: 5,
            max_context_chars: 6000,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `MEDQUERY_WORKSPACE`: Override workspace path
    /// - `MEDQUERY_CONFIG`: Path to config file
    /// - `MEDQUERY_PROVIDER`: Generator provider
    /// - `MEDQUERY_MODEL`: Generator model identifier
    /// - `MEDQUERY_EMBEDDING_PROVIDER` / `MEDQUERY_EMBEDDING_MODEL`
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("MEDQUERY_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("MEDQUERY_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".medquery/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("MEDQUERY_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("MEDQUERY_MODEL") {
            config.model = model;
        }

        if let Ok(provider) = std::env::var("MEDQUERY_EMBEDDING_PROVIDER") {
            config.embedding_provider = provider;
        }

        if let Ok(model) = std::env::var("MEDQUERY_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge settings from a YAML config file into this configuration.
    fn merge_yaml(mut self, path: &std::path::Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(generator) = file.generator {
            if let Some(provider) = generator.provider {
                self.provider = provider;
            }
            if let Some(model) = generator.model {
                self.model = model;
            }
            if generator.endpoint.is_some() {
                self.endpoint = generator.endpoint;
            }
        }

        if let Some(embedding) = file.embedding {
            if let Some(provider) = embedding.provider {
                self.embedding_provider = provider;
            }
            if let Some(model) = embedding.model {
                self.embedding_model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                self.embedding_dimensions = dimensions;
            }
        }

        if let Some(chunking) = file.chunking {
            if let Some(chunk_size) = chunking.chunk_size {
                self.chunk_size = chunk_size;
            }
            if let Some(chunk_overlap) = chunking.chunk_overlap {
                self.chunk_overlap = chunk_overlap;
            }
        }

        if let Some(retrieval) = file.retrieval {
            if let Some(top_k) = retrieval.top_k {
                self.top_k = top_k;
            }
            if let Some(max_context_chars) = retrieval.max_context_chars {
                self.max_context_chars = max_context_chars;
            }
        }

        if let Some(logging) = file.logging {
            if logging.level.is_some() {
                self.log_level = logging.level;
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        tracing::debug!("Merged config from {:?}", path);
        Ok(self)
    }

    /// Apply command-line overrides on top of the loaded configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }
        if let Some(provider) = provider {
            self.provider = provider;
        }
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }
        if verbose {
            self.verbose = true;
            self.log_level = Some("debug".to_string());
        }
        if no_color {
            self.no_color = true;
        }
        self
    }

    /// Validate chunking geometry.
    ///
    /// The overlap must be strictly smaller than the chunk size, otherwise
    /// chunking cannot make forward progress.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be positive".to_string()));
        }
        Ok(())
    }

    /// Get the state directory (.medquery/) for this workspace.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(".medquery")
    }

    /// Get the SQLite index path for this workspace.
    pub fn index_path(&self) -> PathBuf {
        self.state_dir().join("index.sqlite")
    }

    /// Ensure the .medquery directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create state dir {:?}: {}", dir, e))
            })?;
            tracing::debug!("Created state directory at {:?}", dir);
        }
        Ok(())
    }
}
