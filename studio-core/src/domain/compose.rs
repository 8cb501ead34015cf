//! `compose.generate` stage contract

use serde::{Deserialize, Serialize};

/// Validated composition input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeIn {
    pub key: String,
    pub tempo_bpm: u32,
    pub style: String,
    pub duration_sec: u32,
    pub instrumentation: Vec<String>,
}

impl ComposeIn {
    /// Number of 4/4 bars that fill the requested duration, at least one
    pub fn total_bars(&self) -> u32 {
        let beats = f64::from(self.duration_sec) * f64::from(self.tempo_bpm) / 60.0;
        ((beats / 4.0).round() as u32).max(1)
    }
}

/// Global parameters of the piece; key, tempo, style and duration echo the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicSpec {
    pub key: String,
    pub tempo_bpm: u32,
    pub time_signature: String,
    pub style: String,
    pub duration_sec: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookDensity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrangementSection {
    pub section_id: String,
    pub bars: u32,
    pub chords: Vec<String>,
    pub motifs: Vec<String>,
    pub hook_density: HookDensity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentAssignment {
    pub name: String,
    pub role: String,
    pub preset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiPlan {
    pub export: bool,
    pub tracks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderHints {
    pub swing_percent: u32,
    pub humanize_ms: u32,
    pub lufs_target: f64,
    pub ceiling_db: f64,
}

/// Composition stage output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionResult {
    pub music_spec: MusicSpec,
    /// Sections in playback order
    pub arrangement: Vec<ArrangementSection>,
    pub instruments: Vec<InstrumentAssignment>,
    pub stems_plan: Vec<String>,
    pub midi_plan: MidiPlan,
    pub render_hints: RenderHints,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(tempo_bpm: u32, duration_sec: u32) -> ComposeIn {
        ComposeIn {
            key: "C major".into(),
            tempo_bpm,
            style: "electronic-pop".into(),
            duration_sec,
            instrumentation: vec!["drums".into()],
        }
    }

    #[test]
    fn test_total_bars() {
        // 150s at 120bpm = 300 beats = 75 bars
        assert_eq!(input(120, 150).total_bars(), 75);
        assert_eq!(input(90, 60).total_bars(), 23);
    }

    #[test]
    fn test_total_bars_never_zero() {
        assert_eq!(input(20, 5).total_bars(), 1);
    }
}
