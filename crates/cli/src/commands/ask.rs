//! Ask command handler.
//!
//! Runs the full serving pipeline: retrieve similar chunks, synthesize a
//! grounded answer, print it with its citation block.

use clap::Args;
use medquery_core::{config::AppConfig, AppResult};
use medquery_knowledge::Services;

/// Ask a question against the indexed corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of chunks to retrieve (overrides config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let mut config = config.clone();
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        config.validate()?;

        let services = Services::init(&config)?;

        let answer =
            medquery_knowledge::answer_from_workspace(&config, &services, &self.question).await?;

        if self.json {
            let output = serde_json::json!({
                "question": self.question,
                "answer": answer.text,
                "citations": answer.citations,
                "refusal": answer.is_refusal(),
                "model": config.model,
                "provider": config.provider,
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| medquery_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", answer.render());
        }

        Ok(())
    }
}
