//! Stage request DTOs
//!
//! Every field is optional on the wire. `resolve` fills in defaults (recording
//! each one as an assumption), checks ranges and produces the validated stage
//! input that engines consume.

use serde::{Deserialize, Serialize};

use crate::domain::asset::AudioAsset;
use crate::domain::compose::ComposeIn;
use crate::domain::lyrics::{LyricsIn, SectionCounts};
use crate::domain::reintegrate::ReintegrateIn;
use crate::domain::separate::SeparateIn;
use crate::validation::{Resolved, ValidationError, Validator};

pub const MAX_NAME_LEN: usize = 64;
pub const MAX_KEY_LEN: usize = 32;
pub const MAX_PROMPT_LEN: usize = 2000;
pub const MAX_INSTRUMENTS: usize = 16;

pub const DEFAULT_KEY: &str = "C major";
pub const DEFAULT_TEMPO_BPM: u32 = 120;
pub const DEFAULT_PRESET: &str = "pop-clear";
pub const DEFAULT_INSTRUMENTATION: [&str; 4] = ["drums", "bass", "pads", "lead"];

/// Body of `lyrics.generate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LyricsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LengthRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verses: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choruses: Option<i64>,
}

impl LyricsRequest {
    pub fn resolve(self) -> Result<Resolved<LyricsIn>, ValidationError> {
        let mut v = Validator::new();

        let genre = v.text("genre", self.genre, "pop", MAX_NAME_LEN);
        let mood = v.text("mood", self.mood, "joyful", MAX_NAME_LEN);

        let length = self.length.unwrap_or_default();
        let verses = v.integer("length.verses", length.verses, 2, 0..=8);
        let choruses = v.integer("length.choruses", length.choruses, 1, 0..=8);
        if verses + choruses == 0 {
            v.reject("length", "must request at least one section");
        }

        let prompt = v.optional_text("prompt", self.prompt, MAX_PROMPT_LEN);

        v.finish(LyricsIn {
            genre,
            mood,
            length: SectionCounts { verses, choruses },
            prompt,
        })
    }
}

/// Body of `compose.generate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo_bpm: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrumentation: Option<Vec<String>>,
}

impl ComposeRequest {
    pub fn resolve(self) -> Result<Resolved<ComposeIn>, ValidationError> {
        let mut v = Validator::new();

        let key = v.text("key", self.key, DEFAULT_KEY, MAX_KEY_LEN);
        let tempo_bpm = v.integer("tempo_bpm", self.tempo_bpm, DEFAULT_TEMPO_BPM, 20..=300);
        let style = v.text("style", self.style, "electronic-pop", MAX_NAME_LEN);
        let duration_sec = v.integer("duration_sec", self.duration_sec, 150, 5..=1200);

        let instrumentation = match self.instrumentation {
            None => {
                v.assume(format!(
                    "instrumentation not provided; using {}",
                    DEFAULT_INSTRUMENTATION.join(", ")
                ));
                DEFAULT_INSTRUMENTATION.iter().map(|s| s.to_string()).collect()
            }
            Some(list) => {
                if list.is_empty() {
                    v.reject("instrumentation", "must list at least one instrument");
                } else if list.len() > MAX_INSTRUMENTS {
                    v.reject(
                        "instrumentation",
                        format!("must list at most {MAX_INSTRUMENTS} instruments"),
                    );
                }
                list.into_iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let name = name.trim().to_string();
                        if name.is_empty() {
                            v.reject(&format!("instrumentation[{i}]"), "must not be empty");
                        }
                        name
                    })
                    .collect()
            }
        };

        v.finish(ComposeIn {
            key,
            tempo_bpm,
            style,
            duration_sec,
            instrumentation,
        })
    }
}

/// Multipart body of `separate.vocals`
#[derive(Debug, Clone, Default)]
pub struct SeparateRequest {
    pub file: Option<AudioAsset>,
}

impl SeparateRequest {
    pub fn resolve(self) -> Result<Resolved<SeparateIn>, ValidationError> {
        let mut v = Validator::new();
        let file = v.asset("file", self.file);
        v.finish(SeparateIn { file })
    }
}

/// Multipart body of `mix.reintegrate`
///
/// Form fields arrive as text, so `tempo_bpm` is parsed during `resolve`.
#[derive(Debug, Clone, Default)]
pub struct MixRequest {
    pub instrumental: Option<AudioAsset>,
    pub vocals: Option<AudioAsset>,
    pub key: Option<String>,
    pub tempo_bpm: Option<String>,
    pub preset: Option<String>,
}

impl MixRequest {
    pub fn resolve(self) -> Result<Resolved<ReintegrateIn>, ValidationError> {
        let mut v = Validator::new();

        let instrumental = v.asset("instrumental", self.instrumental);
        let vocals = v.asset("vocals", self.vocals);
        let key = v.text("key", self.key, DEFAULT_KEY, MAX_KEY_LEN);

        let tempo_bpm = match self.tempo_bpm.as_deref().map(str::trim) {
            None | Some("") => v.integer("tempo_bpm", None, DEFAULT_TEMPO_BPM, 20..=300),
            Some(raw) => match raw.parse::<i64>() {
                Ok(tempo) => v.integer("tempo_bpm", Some(tempo), DEFAULT_TEMPO_BPM, 20..=300),
                Err(_) => {
                    v.reject("tempo_bpm", "must be an integer");
                    DEFAULT_TEMPO_BPM
                }
            },
        };

        let preset = v.text("preset", self.preset, DEFAULT_PRESET, MAX_NAME_LEN);

        v.finish(ReintegrateIn {
            instrumental,
            vocals,
            key,
            tempo_bpm,
            preset,
        })
    }
}
