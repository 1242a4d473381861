//! Ingest command handler.

use clap::Args;
use medquery_core::{config::AppConfig, AppResult};
use medquery_knowledge::Services;
use std::path::PathBuf;

/// Ingest a document corpus into the index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Corpus file or directory to ingest (pdf, md, txt)
    pub corpus: PathBuf,

    /// Empty the index before ingesting (required to switch embedders)
    #[arg(long)]
    pub reset: bool,

    /// Output statistics as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    /// Execute the ingest command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Ingesting corpus from {:?}", self.corpus);

        let services = Services::init(config)?;

        let stats =
            medquery_knowledge::ingest_into_workspace(config, &services, &self.corpus, self.reset)
                .await?;

        if self.json {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| medquery_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!(
                "Ingested {} documents ({} chunks, {} bytes) in {:.2}s",
                stats.documents_loaded,
                stats.chunks_indexed,
                stats.bytes_processed,
                stats.duration_secs
            );
        }

        Ok(())
    }
}
