//! End-to-end pipeline tests over a temporary workspace.

use crate::embeddings::providers::mock::MockEmbedder;
use crate::services::Services;
use crate::{answer_from_workspace, ingest_into_workspace, workspace_index_stats};
use medquery_core::{AppConfig, AppResult};
use medquery_llm::{GenerationRequest, GenerationResponse, GenerationUsage, Generator};
use medquery_prompt::REFUSAL_TEXT;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Generator returning a fixed answer and counting invocations.
#[derive(Debug)]
struct FixedGenerator {
    answer: String,
    calls: AtomicU32,
}

impl FixedGenerator {
    fn new(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            calls: AtomicU32::new(0),
        })
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Generator for FixedGenerator {
    fn provider_name(&self) -> &str {
        "fixed"
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GenerationResponse {
            content: self.answer.clone(),
            model: request.model.clone(),
            usage: GenerationUsage::new(1, 1),
        })
    }
}

fn test_config(workspace: &TempDir) -> AppConfig {
    AppConfig {
        workspace: workspace.path().to_path_buf(),
        embedding_provider: "mock".to_string(),
        embedding_model: "trigram-v1".to_string(),
        embedding_dimensions: 256,
        chunk_size: 120,
        chunk_overlap: 20,
        top_k: 3,
        ..Default::default()
    }
}

fn test_services(generator: Arc<FixedGenerator>) -> Services {
    Services::from_parts(Arc::new(MockEmbedder::new(256)), generator)
}

/// Two-page corpus document, pages separated by a form feed.
fn write_corpus(workspace: &TempDir) -> PathBuf {
    let dir = workspace.path().join("docs");
    std::fs::create_dir_all(&dir).unwrap();

    let mut file = std::fs::File::create(dir.join("pharmacology.txt")).unwrap();
    write!(
        file,
        "Aspirin is used to reduce fever and relieve mild to moderate pain. \
         Typical adult dosage ranges from 325 to 650 milligrams every four hours. \
         Aspirin should not be given to children with viral infections.\
         \x0c\
         Ibuprofen is a nonsteroidal anti-inflammatory drug. It treats pain, \
         fever, and inflammation. Maximum daily intake without medical advice \
         is 1200 milligrams for adults."
    )
    .unwrap();

    dir
}

#[tokio::test]
async fn test_ingest_then_answer_with_citations() {
    let workspace = TempDir::new().unwrap();
    let corpus = write_corpus(&workspace);
    let config = test_config(&workspace);
    let generator = FixedGenerator::new("Aspirin reduces fever and relieves mild pain.");
    let services = test_services(generator.clone());

    let stats = ingest_into_workspace(&config, &services, &corpus, false)
        .await
        .unwrap();
    assert_eq!(stats.documents_loaded, 1);
    assert!(stats.chunks_indexed > 1);
    assert_eq!(stats.chunks_produced, stats.chunks_indexed);

    let index_stats = workspace_index_stats(&config).unwrap();
    assert_eq!(index_stats.sources_count, 1);
    assert_eq!(index_stats.chunks_count, stats.chunks_indexed);

    let answer = answer_from_workspace(&config, &services, "What is aspirin used for?")
        .await
        .unwrap();

    assert_eq!(generator.call_count(), 1);
    assert!(!answer.is_refusal());
    assert_eq!(answer.citations, vec!["pharmacology.txt"]);
    assert!(answer.render().contains("Sources:\n- pharmacology.txt"));
}

#[tokio::test]
async fn test_empty_index_answers_exact_refusal_without_generation() {
    let workspace = TempDir::new().unwrap();
    let config = test_config(&workspace);
    let generator = FixedGenerator::new("must not be called");
    let services = test_services(generator.clone());

    let answer = answer_from_workspace(&config, &services, "What is aspirin?")
        .await
        .unwrap();

    assert_eq!(answer.text, REFUSAL_TEXT);
    assert!(answer.citations.is_empty());
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_reingest_through_workspace_is_idempotent() {
    let workspace = TempDir::new().unwrap();
    let corpus = write_corpus(&workspace);
    let config = test_config(&workspace);
    let services = test_services(FixedGenerator::new("x"));

    let first = ingest_into_workspace(&config, &services, &corpus, false)
        .await
        .unwrap();
    let second = ingest_into_workspace(&config, &services, &corpus, false)
        .await
        .unwrap();

    assert_eq!(first.chunks_indexed, second.chunks_indexed);
    assert_eq!(
        workspace_index_stats(&config).unwrap().chunks_count,
        first.chunks_indexed
    );
}

#[tokio::test]
async fn test_retrieval_prefers_matching_page() {
    let workspace = TempDir::new().unwrap();
    let corpus = write_corpus(&workspace);
    let config = test_config(&workspace);
    let services = test_services(FixedGenerator::new("x"));

    ingest_into_workspace(&config, &services, &corpus, false)
        .await
        .unwrap();

    let index = crate::index::SqliteIndex::open(&config.index_path()).unwrap();
    let retrieved = crate::retriever::retrieve(
        "ibuprofen anti-inflammatory maximum daily intake",
        services.embedder.as_ref(),
        &index,
        3,
    )
    .await
    .unwrap();

    assert!(!retrieved.is_empty());
    assert!(retrieved[0].chunk.text.to_lowercase().contains("ibuprofen"));
}

#[tokio::test]
async fn test_refusal_answer_renders_without_sources_block() {
    let workspace = TempDir::new().unwrap();
    let corpus = write_corpus(&workspace);
    let config = test_config(&workspace);
    let generator = FixedGenerator::new(REFUSAL_TEXT);
    let services = test_services(generator);

    ingest_into_workspace(&config, &services, &corpus, false)
        .await
        .unwrap();

    let answer = answer_from_workspace(&config, &services, "What is the capital of France?")
        .await
        .unwrap();

    assert!(answer.is_refusal());
    assert!(!answer.render().contains("Sources:"));
}
