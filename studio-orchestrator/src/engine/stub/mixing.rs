//! Separation and reintegration planners

use studio_core::domain::reintegrate::{
    Alignment, EffectSlot, MasterBus, MixTarget, ReintegrateIn, ReintegrationPlan, VocalBus,
};
use studio_core::domain::separate::{
    Postprocess, Preprocess, SeparateIn, SeparationOutputs, SeparationPlan, SourceInfo,
};

use super::probe::probe_asset;
use super::theory::Key;
use crate::engine::{EngineError, EngineOutput, EngineResult};

const WORKING_RATE_HZ: u32 = 44_100;
const DEFAULT_PRESET: &str = "pop-clear";
const DURATION_TOLERANCE_SEC: f64 = 1.0;

pub async fn plan_separation(input: &SeparateIn) -> EngineResult<SeparationPlan> {
    let source = probe_asset(&input.file).await?;
    let stem = input.file.stem();

    let stereo = source.channels.is_none_or(|c| c >= 2);
    let mut warnings = Vec::new();
    if !stereo {
        warnings.push("mono source; stereo image cannot be preserved".to_string());
    }
    if let Some(rate) = source.sample_rate
        && rate != WORKING_RATE_HZ
    {
        warnings.push(format!("source is {rate} Hz; resampled to {WORKING_RATE_HZ} Hz"));
    }

    let plan = SeparationPlan {
        input_asset: input.file.filename.clone(),
        source,
        method: "mdxnet".to_string(),
        quality: "best".to_string(),
        preprocess: Preprocess {
            resample_hz: WORKING_RATE_HZ,
            normalize: true,
        },
        outputs: SeparationOutputs {
            instrumental: format!("{stem}_instrumental.wav"),
            vocals: format!("{stem}_vocals.wav"),
        },
        postprocess: Postprocess {
            stereo_preserve: stereo,
            deverb_light: true,
            residual_gate: 0.1,
        },
    };

    let mut output = EngineOutput::new(plan).assume("single lead vocal");
    output.warnings = warnings;
    Ok(output)
}

pub async fn plan_reintegration(input: &ReintegrateIn) -> EngineResult<ReintegrationPlan> {
    if Key::parse(&input.key).is_none() {
        return Err(EngineError::Rejected(format!(
            "unsupported key '{}'",
            input.key
        )));
    }

    let instrumental = probe_asset(&input.instrumental).await?;
    let vocals = probe_asset(&input.vocals).await?;

    let mut warnings = compare_sources(&instrumental, &vocals);

    let (preset, chain) = match vocal_chain(&input.preset) {
        Some(chain) => (input.preset.clone(), chain),
        None => {
            warnings.push(format!(
                "unknown preset '{}'; using {DEFAULT_PRESET}",
                input.preset
            ));
            (
                DEFAULT_PRESET.to_string(),
                vocal_chain(DEFAULT_PRESET).unwrap_or_default(),
            )
        }
    };

    let plan = ReintegrationPlan {
        instrumental: input.instrumental.filename.clone(),
        vocals: input.vocals.filename.clone(),
        target: MixTarget {
            key: input.key.clone(),
            tempo_bpm: input.tempo_bpm,
        },
        alignment: Alignment {
            method: "dtw".to_string(),
            time_stretch: "elastique".to_string(),
            pitch_shift_semitones: 0,
            formant_preserve: true,
        },
        vocal_bus: VocalBus { preset, chain },
        master_bus: MasterBus {
            limiter_ceiling_db: -1.0,
            lufs_target: -14.0,
        },
        stems_export: vec!["vocal_bus.wav".to_string(), "mix.wav".to_string()],
    };

    let mut output = EngineOutput::new(plan).assume("source key unknown; no pitch shift applied");
    output.warnings = warnings;
    Ok(output)
}

fn vocal_chain(preset: &str) -> Option<Vec<EffectSlot>> {
    let chain = match preset {
        "pop-clear" => vec![
            EffectSlot::new("de-esser", &[("freq_hz", 5500.0), ("amount_db", 4.0)]),
            EffectSlot::new("eq", &[("hpf_hz", 100.0)]),
            EffectSlot::new("compressor", &[("ratio", 2.5), ("gr_db", 3.0)]),
        ],
        "warm-intimate" => vec![
            EffectSlot::new("eq", &[("hpf_hz", 80.0)]),
            EffectSlot::new("compressor", &[("ratio", 2.0), ("gr_db", 2.0)]),
            EffectSlot::new("saturation", &[("drive", 0.2)]),
        ],
        "rap-forward" => vec![
            EffectSlot::new("de-esser", &[("freq_hz", 6000.0), ("amount_db", 5.0)]),
            EffectSlot::new("eq", &[("hpf_hz", 120.0)]),
            EffectSlot::new("compressor", &[("ratio", 4.0), ("gr_db", 5.0)]),
        ],
        _ => return None,
    };
    Some(chain)
}

fn compare_sources(instrumental: &SourceInfo, vocals: &SourceInfo) -> Vec<String> {
    let mut warnings = Vec::new();

    if let (Some(a), Some(b)) = (instrumental.duration_sec, vocals.duration_sec)
        && (a - b).abs() > DURATION_TOLERANCE_SEC
    {
        warnings.push(format!(
            "instrumental ({a:.1}s) and vocals ({b:.1}s) differ in length"
        ));
    }

    if let (Some(a), Some(b)) = (instrumental.sample_rate, vocals.sample_rate)
        && a != b
    {
        warnings.push(format!(
            "sample rates differ ({a} Hz vs {b} Hz); vocals resampled to match"
        ));
    }

    warnings
}
