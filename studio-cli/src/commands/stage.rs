//! Stage command handlers
//!
//! Each stage can run to completion (default), be submitted in the background
//! with `--detach`, or be answered as a plan with `--plan`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use serde::Serialize;
use studio_core::domain::asset::AudioAsset;
use studio_core::domain::compose::CompositionResult;
use studio_core::domain::envelope::ResponseMeta;
use studio_core::domain::lyrics::LyricsResult;
use studio_core::dto::response::SubmitResponse;
use studio_core::dto::stage::{
    ComposeRequest, LengthRequest, LyricsRequest, MixRequest, SeparateRequest,
};
use uuid::Uuid;

use crate::config::Config;

/// How a stage request is sent
#[derive(Args, Debug, Clone, Copy)]
pub struct RunMode {
    /// Only ask for a plan; no job is recorded
    #[arg(long, conflicts_with = "detach")]
    pub plan: bool,

    /// Submit in the background and print the job id
    #[arg(long)]
    pub detach: bool,
}

#[derive(Args, Debug)]
pub struct LyricsArgs {
    /// Genre (default: pop)
    #[arg(long)]
    genre: Option<String>,

    /// Mood (default: joyful)
    #[arg(long)]
    mood: Option<String>,

    /// Number of verses
    #[arg(long)]
    verses: Option<i64>,

    /// Number of choruses
    #[arg(long)]
    choruses: Option<i64>,

    /// Free-text theme
    #[arg(short, long)]
    prompt: Option<String>,

    #[command(flatten)]
    mode: RunMode,
}

impl LyricsArgs {
    fn request(&self) -> LyricsRequest {
        let length = (self.verses.is_some() || self.choruses.is_some()).then(|| LengthRequest {
            verses: self.verses,
            choruses: self.choruses,
        });
        LyricsRequest {
            genre: self.genre.clone(),
            mood: self.mood.clone(),
            length,
            prompt: self.prompt.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Key, e.g. "A minor"
    #[arg(long)]
    key: Option<String>,

    /// Tempo in BPM
    #[arg(long)]
    tempo: Option<i64>,

    /// Style tag
    #[arg(long)]
    style: Option<String>,

    /// Target duration in seconds
    #[arg(long)]
    duration: Option<i64>,

    /// Instruments (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    instrument: Vec<String>,

    #[command(flatten)]
    mode: RunMode,
}

impl ComposeArgs {
    fn request(&self) -> ComposeRequest {
        ComposeRequest {
            key: self.key.clone(),
            tempo_bpm: self.tempo,
            style: self.style.clone(),
            duration_sec: self.duration,
            instrumentation: (!self.instrument.is_empty()).then(|| self.instrument.clone()),
        }
    }
}

#[derive(Args, Debug)]
pub struct SeparateArgs {
    /// Audio file holding the full mix
    file: PathBuf,

    #[command(flatten)]
    mode: RunMode,
}

#[derive(Args, Debug)]
pub struct MixArgs {
    /// Instrumental audio file
    instrumental: PathBuf,

    /// Vocal audio file
    vocals: PathBuf,

    /// Target key (default: C major)
    #[arg(long)]
    key: Option<String>,

    /// Target tempo in BPM
    #[arg(long)]
    tempo: Option<String>,

    /// Vocal chain preset (pop-clear, warm-intimate, rap-forward)
    #[arg(long)]
    preset: Option<String>,

    #[command(flatten)]
    mode: RunMode,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn run_lyrics(args: LyricsArgs, config: &Config) -> Result<()> {
    let client = config.client();
    let req = args.request();

    if args.mode.plan {
        let plan = client.plan_lyrics(req).await?;
        print_meta(&plan.meta);
        print_lyrics(&plan.lyrics_result);
    } else if args.mode.detach {
        print_submitted(&client.submit_lyrics(req).await?);
    } else {
        let response = client.generate_lyrics(req).await?;
        print_job_line(response.job_id);
        print_meta(&response.meta);
        print_lyrics(&response.result);
    }

    Ok(())
}

pub async fn run_compose(args: ComposeArgs, config: &Config) -> Result<()> {
    let client = config.client();
    let req = args.request();

    if args.mode.plan {
        let plan = client.plan_compose(req).await?;
        print_meta(&plan.meta);
        print_composition(&plan.composition_result);
    } else if args.mode.detach {
        print_submitted(&client.submit_compose(req).await?);
    } else {
        let response = client.compose(req).await?;
        print_job_line(response.job_id);
        print_meta(&response.meta);
        print_composition(&response.result);
    }

    Ok(())
}

pub async fn run_separate(args: SeparateArgs, config: &Config) -> Result<()> {
    let client = config.client();
    let req = SeparateRequest {
        file: Some(read_asset(&args.file).await?),
    };

    if args.mode.plan {
        let plan = client.plan_separate(req).await?;
        print_meta(&plan.meta);
        print_json("Separation plan:", &plan.separation_plan)?;
    } else if args.mode.detach {
        print_submitted(&client.submit_separate(req).await?);
    } else {
        let response = client.separate_vocals(req).await?;
        print_job_line(response.job_id);
        print_meta(&response.meta);
        print_json("Separation plan:", &response.result)?;
    }

    Ok(())
}

pub async fn run_mix(args: MixArgs, config: &Config) -> Result<()> {
    let client = config.client();
    let req = MixRequest {
        instrumental: Some(read_asset(&args.instrumental).await?),
        vocals: Some(read_asset(&args.vocals).await?),
        key: args.key,
        tempo_bpm: args.tempo,
        preset: args.preset,
    };

    if args.mode.plan {
        let plan = client.plan_reintegrate(req).await?;
        print_meta(&plan.meta);
        print_json("Re-integration plan:", &plan.reintegration_plan)?;
    } else if args.mode.detach {
        print_submitted(&client.submit_reintegrate(req).await?);
    } else {
        let response = client.reintegrate(req).await?;
        print_job_line(response.job_id);
        print_meta(&response.meta);
        print_json("Re-integration plan:", &response.result)?;
    }

    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

async fn read_asset(path: &Path) -> Result<AudioAsset> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read audio file {}", path.display()))?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let asset = AudioAsset::new(filename, data);
    Ok(match content_type_for(&asset) {
        Some(mime) => asset.with_content_type(mime),
        None => asset,
    })
}

fn content_type_for(asset: &AudioAsset) -> Option<&'static str> {
    match asset.extension()?.as_str() {
        "wav" => Some("audio/wav"),
        "mp3" => Some("audio/mpeg"),
        "flac" => Some("audio/flac"),
        "ogg" => Some("audio/ogg"),
        "m4a" | "aac" => Some("audio/aac"),
        _ => None,
    }
}

fn print_job_line(job_id: Uuid) {
    println!("{} Job {}", "✓".green(), job_id.to_string().cyan());
}

fn print_submitted(submitted: &SubmitResponse) {
    println!(
        "{} Submitted {} job {} ({})",
        "✓".green(),
        submitted.kind.to_string().bold(),
        submitted.job_id.to_string().cyan(),
        submitted.state.to_string().yellow()
    );
    println!(
        "{}",
        format!("  Follow it with: studio job wait {}", submitted.job_id).dimmed()
    );
}

fn print_meta(meta: &ResponseMeta) {
    for assumption in &meta.assumptions {
        println!("  {} {}", "assumes".yellow(), assumption);
    }
    for warning in &meta.warnings {
        println!("  {} {}", "warning".red(), warning);
    }
    println!();
}

fn print_lyrics(lyrics: &LyricsResult) {
    println!("{}", lyrics.title.bold());
    println!(
        "{}",
        format!(
            "{} / {} / rhyme {}",
            lyrics.style.genre, lyrics.style.mood, lyrics.constraints.rhyme_scheme
        )
        .dimmed()
    );

    for section in &lyrics.sections {
        println!();
        println!("[{}]", section.id.cyan());
        for line in &section.lines {
            println!("  {}", line);
        }
    }

    if let Some(notes) = &lyrics.notes {
        println!();
        println!("{}", notes.dimmed());
    }
}

fn print_composition(composition: &CompositionResult) {
    let spec = &composition.music_spec;
    println!(
        "{} {} at {} BPM, {}s, {}",
        "Composition:".bold(),
        spec.key.cyan(),
        spec.tempo_bpm,
        spec.duration_sec,
        spec.style
    );
    println!();

    for section in &composition.arrangement {
        println!(
            "  {:<8} {:>2} bars  {}  {}",
            section.section_id.cyan(),
            section.bars,
            section.chords.join(" - "),
            format!("hooks: {:?}", section.hook_density)
                .to_lowercase()
                .dimmed()
        );
    }

    println!();
    println!("{}", "Instruments:".bold());
    for instrument in &composition.instruments {
        println!(
            "  {} {} ({})",
            "▸".cyan(),
            instrument.name,
            instrument.role.dimmed()
        );
    }
    println!("  Stems: {}", composition.stems_plan.join(", "));
}

fn print_json<T: Serialize>(title: &str, value: &T) -> Result<()> {
    println!("{}", title.bold());
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
