//! Stats command handler.

use clap::Args;
use medquery_core::{config::AppConfig, AppResult};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    /// Execute the stats command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let stats = medquery_knowledge::workspace_index_stats(config)?;

        if self.json {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| medquery_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("Index: {:?}", config.index_path());
            println!("Sources: {}", stats.sources_count);
            println!("Chunks:  {}", stats.chunks_count);
        }

        Ok(())
    }
}
