//! Clean command handler.

use clap::Args;
use medquery_core::{config::AppConfig, AppError, AppResult};

/// Remove the index and derived state
#[derive(Args, Debug)]
pub struct CleanCommand {
    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl CleanCommand {
    /// Execute the clean command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let state_dir = config.state_dir();

        if !state_dir.exists() {
            println!("Nothing to clean: {:?} does not exist", state_dir);
            return Ok(());
        }

        if !self.yes {
            println!("This will delete {:?} and its index. Continue? [y/N]", state_dir);
            let mut input = String::new();
            std::io::stdin()
                .read_line(&mut input)
                .map_err(|e| AppError::Config(format!("Failed to read confirmation: {}", e)))?;
            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        std::fs::remove_dir_all(&state_dir)
            .map_err(|e| AppError::Config(format!("Failed to remove {:?}: {}", state_dir, e)))?;

        tracing::info!("Removed state directory {:?}", state_dir);
        println!("Removed {:?}", state_dir);

        Ok(())
    }
}
