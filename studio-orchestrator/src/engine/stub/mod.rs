//! Deterministic stub engine
//!
//! Produces contract-shaped output from templates and simple rules. The same
//! input always yields the same result, which keeps the pipeline testable
//! without a model service.

mod arrangement;
mod lyrics;
mod mixing;
mod probe;
mod theory;

#[cfg(test)]
pub(crate) use probe::tests as probe_tests;

use async_trait::async_trait;
use studio_core::domain::compose::{ComposeIn, CompositionResult};
use studio_core::domain::lyrics::{LyricsIn, LyricsResult};
use studio_core::domain::reintegrate::{ReintegrateIn, ReintegrationPlan};
use studio_core::domain::separate::{SeparateIn, SeparationPlan};

use super::{
    ComposeEngine, EngineOutput, EngineResult, LyricsEngine, ReintegrationEngine,
    SeparationEngine,
};

#[derive(Debug, Clone, Default)]
pub struct StubEngine;

impl StubEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LyricsEngine for StubEngine {
    async fn generate(&self, input: &LyricsIn) -> EngineResult<LyricsResult> {
        tracing::debug!(
            "Writing {} verse(s) and {} chorus(es)",
            input.length.verses,
            input.length.choruses
        );
        let mut output = EngineOutput::new(lyrics::write(input));
        if input.prompt.is_none() {
            output = output.assume("no prompt given; theme derived from mood and genre");
        }
        Ok(output)
    }
}

#[async_trait]
impl ComposeEngine for StubEngine {
    async fn compose(&self, input: &ComposeIn) -> EngineResult<CompositionResult> {
        tracing::debug!("Arranging {} bars in {}", input.total_bars(), input.key);
        arrangement::plan(input)
    }
}

#[async_trait]
impl SeparationEngine for StubEngine {
    async fn separate(&self, input: &SeparateIn) -> EngineResult<SeparationPlan> {
        mixing::plan_separation(input).await
    }
}

#[async_trait]
impl ReintegrationEngine for StubEngine {
    async fn reintegrate(&self, input: &ReintegrateIn) -> EngineResult<ReintegrationPlan> {
        mixing::plan_reintegration(input).await
    }
}
