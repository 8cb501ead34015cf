//! `mix.reintegrate` stage contract

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::asset::AudioAsset;

/// Validated reintegration input
#[derive(Debug, Clone)]
pub struct ReintegrateIn {
    pub instrumental: AudioAsset,
    pub vocals: AudioAsset,
    pub key: String,
    pub tempo_bpm: u32,
    pub preset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixTarget {
    pub key: String,
    pub tempo_bpm: u32,
}

/// How the vocal is aligned to the instrumental
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub method: String,
    pub time_stretch: String,
    pub pitch_shift_semitones: i32,
    pub formant_preserve: bool,
}

/// One effect in the vocal chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSlot {
    pub fx: String,
    pub params: BTreeMap<String, f64>,
}

impl EffectSlot {
    pub fn new(fx: &str, params: &[(&str, f64)]) -> Self {
        Self {
            fx: fx.to_string(),
            params: params
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocalBus {
    pub preset: String,
    /// Effects in processing order
    pub chain: Vec<EffectSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterBus {
    pub limiter_ceiling_db: f64,
    pub lufs_target: f64,
}

/// Reintegration stage output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReintegrationPlan {
    pub instrumental: String,
    pub vocals: String,
    pub target: MixTarget,
    pub alignment: Alignment,
    pub vocal_bus: VocalBus,
    pub master_bus: MasterBus,
    pub stems_export: Vec<String>,
}
