//! `separate.vocals` stage contract

use serde::{Deserialize, Serialize};

use super::asset::AudioAsset;

/// Validated separation input
#[derive(Debug, Clone)]
pub struct SeparateIn {
    pub file: AudioAsset,
}

/// What the engine learned about the uploaded audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocess {
    pub resample_hz: u32,
    pub normalize: bool,
}

/// Names of the assets the separation produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationOutputs {
    pub instrumental: String,
    pub vocals: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Postprocess {
    pub stereo_preserve: bool,
    pub deverb_light: bool,
    pub residual_gate: f64,
}

/// Separation stage output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationPlan {
    pub input_asset: String,
    pub source: SourceInfo,
    pub method: String,
    pub quality: String,
    pub preprocess: Preprocess,
    pub outputs: SeparationOutputs,
    pub postprocess: Postprocess,
}
