//! Generation engines
//!
//! One trait per stage. The coordinator only ever talks to these traits, so
//! an engine can be swapped (deterministic stub, remote model service) at
//! startup without touching the ledger or the HTTP layer.

pub mod remote;
pub mod stub;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use studio_core::domain::compose::{ComposeIn, CompositionResult};
use studio_core::domain::lyrics::{LyricsIn, LyricsResult};
use studio_core::domain::reintegrate::{ReintegrateIn, ReintegrationPlan};
use studio_core::domain::separate::{SeparateIn, SeparationPlan};
use thiserror::Error;

use crate::config::{Config, EngineMode};

pub use remote::RemoteEngine;
pub use stub::StubEngine;

/// Engine error type
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine understood the input and refused it (unsupported key, corrupt media)
    #[error("rejected: {0}")]
    Rejected(String),

    /// The engine could not be reached
    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The engine answered with something that does not fit the stage contract
    #[error("malformed output: {0}")]
    Malformed(String),
}

impl EngineError {
    /// Message safe to hand to callers and to record on the job
    ///
    /// Only rejections carry the engine's own wording; transport and decoding
    /// details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            EngineError::Rejected(reason) => reason.clone(),
            EngineError::Unavailable(_) => "generation engine is unavailable".to_string(),
            EngineError::TimedOut(limit) => {
                format!("generation engine timed out after {}s", limit.as_secs())
            }
            EngineError::Malformed(_) => "generation engine returned malformed output".to_string(),
        }
    }
}

/// Stage output plus the notes the engine made while producing it
#[derive(Debug, Clone)]
pub struct EngineOutput<T> {
    pub value: T,
    pub assumptions: Vec<String>,
    pub warnings: Vec<String>,
}

impl<T> EngineOutput<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            assumptions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn assume(mut self, note: impl Into<String>) -> Self {
        self.assumptions.push(note.into());
        self
    }

    pub fn warn(mut self, note: impl Into<String>) -> Self {
        self.warnings.push(note.into());
        self
    }
}

pub type EngineResult<T> = Result<EngineOutput<T>, EngineError>;

#[async_trait]
pub trait LyricsEngine: Send + Sync {
    async fn generate(&self, input: &LyricsIn) -> EngineResult<LyricsResult>;
}

#[async_trait]
pub trait ComposeEngine: Send + Sync {
    async fn compose(&self, input: &ComposeIn) -> EngineResult<CompositionResult>;
}

#[async_trait]
pub trait SeparationEngine: Send + Sync {
    async fn separate(&self, input: &SeparateIn) -> EngineResult<SeparationPlan>;
}

#[async_trait]
pub trait ReintegrationEngine: Send + Sync {
    async fn reintegrate(&self, input: &ReintegrateIn) -> EngineResult<ReintegrationPlan>;
}

/// The engine behind each stage
#[derive(Clone)]
pub struct Engines {
    pub lyrics: Arc<dyn LyricsEngine>,
    pub compose: Arc<dyn ComposeEngine>,
    pub separation: Arc<dyn SeparationEngine>,
    pub reintegration: Arc<dyn ReintegrationEngine>,
}

impl Engines {
    /// Every stage backed by one engine value
    pub fn uniform<E>(engine: E) -> Self
    where
        E: LyricsEngine + ComposeEngine + SeparationEngine + ReintegrationEngine + 'static,
    {
        let engine = Arc::new(engine);
        Self {
            lyrics: engine.clone(),
            compose: engine.clone(),
            separation: engine.clone(),
            reintegration: engine,
        }
    }

    pub fn stub() -> Self {
        Self::uniform(StubEngine::new())
    }

    pub fn from_config(config: &Config) -> Self {
        match &config.engine {
            EngineMode::Stub => Self::stub(),
            EngineMode::Remote { base_url } => {
                Self::uniform(RemoteEngine::new(base_url.clone(), config.engine_timeout))
            }
        }
    }
}

/// Runs an engine call, turning an overrun of `limit` into `TimedOut`
pub async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = EngineResult<T>>,
) -> EngineResult<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::TimedOut(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_message_hides_internals() {
        let err = EngineError::Unavailable("connection refused (os error 111) at 10.0.0.3".into());
        assert!(!err.public_message().contains("10.0.0.3"));

        let err = EngineError::Malformed("missing field `title` at line 1".into());
        assert!(!err.public_message().contains("title"));

        let err = EngineError::Rejected("unsupported key 'H major'".into());
        assert_eq!(err.public_message(), "unsupported key 'H major'");
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(EngineOutput::new(()))
        };
        let err = with_timeout(Duration::from_millis(10), slow).await.unwrap_err();
        assert!(matches!(err, EngineError::TimedOut(_)));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through() {
        let fast = async { Ok(EngineOutput::new(7).warn("careful")) };
        let output = with_timeout(Duration::from_secs(1), fast).await.unwrap();
        assert_eq!(output.value, 7);
        assert_eq!(output.warnings, vec!["careful"]);
    }
}
