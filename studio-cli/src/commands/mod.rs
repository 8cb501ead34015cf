//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod feedback;
mod job;
mod stage;

pub use feedback::FeedbackArgs;
pub use job::JobCommands;
pub use stage::{ComposeArgs, LyricsArgs, MixArgs, SeparateArgs};

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate song lyrics
    Lyrics(LyricsArgs),
    /// Generate a composition plan
    Compose(ComposeArgs),
    /// Plan vocal separation for an audio file
    Separate(SeparateArgs),
    /// Plan re-integration of a vocal take with an instrumental
    Mix(MixArgs),
    /// Job inspection
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Rate a generated result
    Feedback(FeedbackArgs),
    /// Print the system prompt handed to hosted engines
    Prompt,
    /// Show a project summary
    Project {
        /// Project ID
        id: String,
    },
    /// Check that the orchestrator is reachable
    Health,
}

/// Route a command to its handler module
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Lyrics(args) => stage::run_lyrics(args, config).await,
        Commands::Compose(args) => stage::run_compose(args, config).await,
        Commands::Separate(args) => stage::run_separate(args, config).await,
        Commands::Mix(args) => stage::run_mix(args, config).await,
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Feedback(args) => feedback::submit(args, config).await,
        Commands::Prompt => {
            println!("{}", config.client().system_prompt().await?);
            Ok(())
        }
        Commands::Project { id } => {
            let project = config.client().project(&id).await?;
            println!("{}", "Project:".bold());
            println!("  ID:      {}", project.id.cyan());
            println!("  Status:  {}", project.status);
            if project.assets.is_empty() {
                println!("  Assets:  {}", "none".dimmed());
            } else {
                println!("  Assets:");
                for asset in &project.assets {
                    println!("    {} {}", "▸".cyan(), asset);
                }
            }
            Ok(())
        }
        Commands::Health => {
            config.client().health().await?;
            println!(
                "{} Orchestrator at {} is healthy",
                "✓".green(),
                config.server_url.cyan()
            );
            Ok(())
        }
    }
}
