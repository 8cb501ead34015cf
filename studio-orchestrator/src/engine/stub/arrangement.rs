//! Rule-based arrangement planner

use studio_core::domain::compose::{
    ArrangementSection, ComposeIn, CompositionResult, HookDensity, InstrumentAssignment, MidiPlan,
    MusicSpec, RenderHints,
};

use super::theory::{Key, Mode};
use crate::engine::{EngineError, EngineOutput, EngineResult};

pub const TIME_SIGNATURE: &str = "4/4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Outro,
}

impl Part {
    fn prefix(self) -> char {
        match self {
            Part::Intro => 'I',
            Part::Verse => 'V',
            Part::Chorus => 'C',
            Part::Bridge => 'B',
            Part::Outro => 'O',
        }
    }

    fn motif(self) -> &'static str {
        match self {
            Part::Intro => "ambient-swell",
            Part::Verse => "plucky-synth",
            Part::Chorus => "bright-lead",
            Part::Bridge => "breakdown",
            Part::Outro => "fade-tail",
        }
    }

    fn hook_density(self) -> HookDensity {
        match self {
            Part::Chorus => HookDensity::High,
            Part::Bridge => HookDensity::Medium,
            Part::Intro | Part::Verse | Part::Outro => HookDensity::Low,
        }
    }

    fn degrees(self, mode: Mode) -> &'static [usize] {
        match (self, mode) {
            (Part::Verse | Part::Intro | Part::Outro, Mode::Major) => &[1, 5, 6, 4],
            (Part::Chorus, Mode::Major) => &[4, 5, 3, 6],
            (Part::Bridge, Mode::Major) => &[6, 4, 1, 5],
            (Part::Verse | Part::Intro | Part::Outro, Mode::Minor) => &[1, 6, 3, 7],
            (Part::Chorus, Mode::Minor) => &[6, 7, 1, 5],
            (Part::Bridge, Mode::Minor) => &[4, 6, 3, 7],
        }
    }
}

/// Song form used until the bars run out, then verse/chorus pairs repeat
const FORM: [(Part, u32); 8] = [
    (Part::Intro, 4),
    (Part::Verse, 8),
    (Part::Chorus, 8),
    (Part::Verse, 8),
    (Part::Chorus, 8),
    (Part::Bridge, 8),
    (Part::Chorus, 8),
    (Part::Outro, 4),
];
const REPEAT: [(Part, u32); 2] = [(Part::Verse, 8), (Part::Chorus, 8)];

/// Role and preset for instruments the planner knows by name
fn known_instrument(name: &str) -> Option<(&'static str, &'static str)> {
    let assignment = match name.to_ascii_lowercase().as_str() {
        "drums" | "percussion" => ("rhythm", "pop-tight"),
        "bass" => ("low-end", "sine-punch"),
        "pads" | "pad" => ("harmony", "warm-pad"),
        "lead" | "synth" => ("melody", "saw-bright"),
        "piano" | "keys" => ("harmony", "bright-grand"),
        "guitar" => ("harmony", "clean-strum"),
        "strings" => ("harmony", "legato-ensemble"),
        "vocals" | "vox" => ("melody", "lead-vocal"),
        _ => return None,
    };
    Some(assignment)
}

pub fn plan(input: &ComposeIn) -> EngineResult<CompositionResult> {
    let key = Key::parse(&input.key)
        .ok_or_else(|| EngineError::Rejected(format!("unsupported key '{}'", input.key)))?;

    let arrangement = arrange(&key, input.total_bars());

    let mut unknown = Vec::new();
    let instruments: Vec<InstrumentAssignment> = input
        .instrumentation
        .iter()
        .map(|name| {
            let (role, preset) = known_instrument(name).unwrap_or_else(|| {
                unknown.push(name.clone());
                ("texture", "init")
            });
            InstrumentAssignment {
                name: name.clone(),
                role: role.to_string(),
                preset: preset.to_string(),
            }
        })
        .collect();

    // Harmony instruments share a single "chords" stem
    let mut stems_plan: Vec<String> = Vec::new();
    for instrument in &instruments {
        let stem = if instrument.role == "harmony" {
            "chords".to_string()
        } else {
            instrument.name.to_ascii_lowercase()
        };
        if !stems_plan.contains(&stem) {
            stems_plan.push(stem);
        }
    }

    let result = CompositionResult {
        music_spec: MusicSpec {
            key: input.key.clone(),
            tempo_bpm: input.tempo_bpm,
            time_signature: TIME_SIGNATURE.to_string(),
            style: input.style.clone(),
            duration_sec: input.duration_sec,
        },
        arrangement,
        instruments,
        midi_plan: MidiPlan {
            export: true,
            tracks: stems_plan.clone(),
        },
        stems_plan,
        render_hints: RenderHints {
            swing_percent: 0,
            humanize_ms: 12,
            lufs_target: -14.0,
            ceiling_db: -1.0,
        },
    };

    let mut output = EngineOutput::new(result)
        .assume(format!("time signature {TIME_SIGNATURE}"))
        .assume(format!("key interpreted as {key}"));
    for name in unknown {
        output = output.warn(format!(
            "instrument '{name}' has no known role; assigned as texture with the init preset"
        ));
    }
    Ok(output)
}

fn arrange(key: &Key, total_bars: u32) -> Vec<ArrangementSection> {
    let mut remaining = total_bars;
    let mut counts = [0u32; 5];
    let mut sections = Vec::new();

    for (part, bars) in FORM.iter().chain(REPEAT.iter().cycle()) {
        if remaining == 0 {
            break;
        }
        let bars = (*bars).min(remaining);
        remaining -= bars;

        let count = &mut counts[*part as usize];
        *count += 1;

        sections.push(ArrangementSection {
            section_id: format!("{}{}", part.prefix(), count),
            bars,
            chords: key.progression(part.degrees(key.mode())),
            motifs: vec![part.motif().to_string()],
            hook_density: part.hook_density(),
        });
    }

    sections
}
