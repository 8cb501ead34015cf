//! Job command handlers
//!
//! Handles listing jobs, reading one job's status and waiting for a job to
//! reach a terminal state.

use std::time::Duration;

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;
use studio_client::StudioClient;
use studio_core::domain::job::{Job, JobState};
use tokio::time::Instant;

use crate::config::Config;
use crate::id_resolver::resolve_job_id;
use crate::types::IdOrPrefix;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List all jobs in the ledger
    List,
    /// Get job status
    Status {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Poll a job until it completes or fails
    Wait {
        /// Job ID or unambiguous prefix
        id: String,

        /// Poll interval in milliseconds
        #[arg(long, default_value = "500")]
        interval_ms: u64,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        JobCommands::List => list_jobs(&client).await,
        JobCommands::Status { id } => job_status(&client, &id).await,
        JobCommands::Wait {
            id,
            interval_ms,
            timeout,
        } => {
            wait_for_job(
                &client,
                &id,
                Duration::from_millis(interval_ms.max(50)),
                timeout.map(Duration::from_secs),
            )
            .await
        }
    }
}

async fn list_jobs(client: &StudioClient) -> Result<()> {
    let jobs = client.list_jobs().await?;

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs {
            print_job_summary(&job);
        }
    }

    Ok(())
}

async fn job_status(client: &StudioClient, id: &str) -> Result<()> {
    let uuid = resolve_job_id(client, &IdOrPrefix::parse(id)).await?;
    let job = client.job_status(uuid).await?;
    print_job_details(&job);
    Ok(())
}

async fn wait_for_job(
    client: &StudioClient,
    id: &str,
    interval: Duration,
    timeout: Option<Duration>,
) -> Result<()> {
    let uuid = resolve_job_id(client, &IdOrPrefix::parse(id)).await?;
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut last_state = None;

    loop {
        let job = client.job_status(uuid).await?;

        if last_state != Some(job.state) {
            println!("  {} {}", "▸".cyan(), colorize_state(job.state));
            last_state = Some(job.state);
        }

        if job.state.is_terminal() {
            println!();
            print_job_details(&job);
            if job.state == JobState::Failed {
                bail!("Job {} failed", uuid);
            }
            return Ok(());
        }

        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                bail!("Timed out waiting for job {} (last state: {})", uuid, job.state);
            }
        }

        tokio::time::sleep(interval).await;
    }
}

fn print_job_summary(job: &Job) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    Kind:     {}", job.kind);
    println!("    State:    {}", colorize_state(job.state));
    println!(
        "    Created:  {}",
        job.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.to_string().cyan());
    println!("  Kind:        {}", job.kind);
    println!("  State:       {}", colorize_state(job.state));
    println!("  Created:     {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(started) = job.started_at {
        println!("  Started:     {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(completed) = job.completed_at {
        println!("  Finished:    {}", completed.format("%Y-%m-%d %H:%M:%S"));

        let since = job.started_at.unwrap_or(job.created_at);
        let elapsed = completed.signed_duration_since(since);
        println!("  Duration:    {}ms", elapsed.num_milliseconds());
    }

    if let Some(result) = &job.result {
        println!("\n{}", "Result:".bold());
        match serde_json::to_string_pretty(result) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{:?}", result),
        }
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("  {:?}: {}", error.kind, error.message.red());
    }
}

fn colorize_state(state: JobState) -> ColoredString {
    let label = state.to_string();
    match state {
        JobState::Pending => label.yellow(),
        JobState::Running => label.cyan(),
        JobState::Completed => label.green(),
        JobState::Failed => label.red(),
    }
}
