//! Pipeline Coordinator
//!
//! Drives each stage request through validation, the job ledger and the
//! stage's engine, and wraps engine output in the response envelope.
//!
//! Three entry points exist per stage:
//! - `generate_lyrics`/`compose`/`separate_vocals`/`reintegrate` run the job
//!   to completion and return the result with its job id
//! - `submit_*` create the job and hand the engine work to the dispatcher
//! - `plan_*` call the engine without recording a job

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use studio_core::domain::compose::CompositionResult;
use studio_core::domain::envelope::ResponseMeta;
use studio_core::domain::feedback::Feedback;
use studio_core::domain::job::{ErrorKind, Job, JobError, JobState, StageKind};
use studio_core::domain::lyrics::LyricsResult;
use studio_core::domain::project::ProjectSummary;
use studio_core::domain::reintegrate::ReintegrationPlan;
use studio_core::domain::separate::SeparationPlan;
use studio_core::dto::feedback::FeedbackRequest;
use studio_core::dto::response::{
    CompositionPlanResponse, LyricsPlanResponse, ReintegrationPlanResponse,
    SeparationPlanResponse, StageResponse, SubmitResponse,
};
use studio_core::dto::stage::{ComposeRequest, LyricsRequest, MixRequest, SeparateRequest};
use studio_core::validation::{Resolved, ValidationError};
use thiserror::Error;
use uuid::Uuid;

use super::dispatch::Dispatcher;
use crate::engine::{EngineError, EngineOutput, EngineResult, Engines, with_timeout};
use crate::ledger::{Ledger, LedgerError};

/// Coordinator error type
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The engine failed; `job_id` is set when a job was recorded for the call
    #[error("{kind} failed: {message}")]
    EngineFailure {
        job_id: Option<Uuid>,
        kind: StageKind,
        message: String,
    },
}

impl CoordinatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoordinatorError::Validation(_) => ErrorKind::ValidationError,
            CoordinatorError::Ledger(e) => e.kind(),
            CoordinatorError::EngineFailure { .. } => ErrorKind::EngineFailure,
        }
    }
}

pub struct Coordinator {
    ledger: Arc<Ledger>,
    engines: Engines,
    engine_timeout: Duration,
    dispatcher: Dispatcher,
}

impl Coordinator {
    /// Creates a coordinator and starts its detached-job dispatcher
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        ledger: Arc<Ledger>,
        engines: Engines,
        engine_timeout: Duration,
        max_parallel_jobs: usize,
    ) -> Self {
        let dispatcher = Dispatcher::start(Arc::clone(&ledger), max_parallel_jobs);
        Self {
            ledger,
            engines,
            engine_timeout,
            dispatcher,
        }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    // =============================================================================
    // Stage runs
    // =============================================================================

    pub async fn generate_lyrics(
        &self,
        req: LyricsRequest,
    ) -> Result<StageResponse<LyricsResult>, CoordinatorError> {
        let Resolved { input, assumptions } = req.resolve()?;
        let engine = Arc::clone(&self.engines.lyrics);
        self.run_stage(StageKind::LyricsGenerate, assumptions, async move {
            engine.generate(&input).await
        })
        .await
    }

    pub async fn compose(
        &self,
        req: ComposeRequest,
    ) -> Result<StageResponse<CompositionResult>, CoordinatorError> {
        let Resolved { input, assumptions } = req.resolve()?;
        let engine = Arc::clone(&self.engines.compose);
        self.run_stage(StageKind::ComposeGenerate, assumptions, async move {
            engine.compose(&input).await
        })
        .await
    }

    pub async fn separate_vocals(
        &self,
        req: SeparateRequest,
    ) -> Result<StageResponse<SeparationPlan>, CoordinatorError> {
        let Resolved { input, assumptions } = req.resolve()?;
        let engine = Arc::clone(&self.engines.separation);
        self.run_stage(StageKind::SeparateVocals, assumptions, async move {
            engine.separate(&input).await
        })
        .await
    }

    pub async fn reintegrate(
        &self,
        req: MixRequest,
    ) -> Result<StageResponse<ReintegrationPlan>, CoordinatorError> {
        let Resolved { input, assumptions } = req.resolve()?;
        let engine = Arc::clone(&self.engines.reintegration);
        self.run_stage(StageKind::MixReintegrate, assumptions, async move {
            engine.reintegrate(&input).await
        })
        .await
    }

    /// Records a job for the call and waits for the engine
    ///
    /// The engine call and the job's final transition run on their own task,
    /// so a caller that goes away mid-run still leaves a terminal job behind.
    async fn run_stage<T, Fut>(
        &self,
        kind: StageKind,
        assumptions: Vec<String>,
        call: Fut,
    ) -> Result<StageResponse<T>, CoordinatorError>
    where
        T: Serialize + Send + 'static,
        Fut: Future<Output = EngineResult<T>> + Send + 'static,
    {
        let job_id = self.ledger.create(kind)?;
        self.ledger.mark_running(job_id).map_err(ledger_fault)?;
        tracing::info!("Job {} started ({})", job_id, kind);

        let ledger = Arc::clone(&self.ledger);
        let limit = self.engine_timeout;
        let run = tokio::spawn(async move { settle(&ledger, job_id, kind, limit, call).await });

        let output = match run.await {
            Ok(settled) => settled?,
            Err(e) => {
                let error = EngineError::Unavailable(format!("engine task ended early: {e}"));
                return Err(fail_job(&self.ledger, job_id, kind, error));
            }
        };

        let EngineOutput {
            value: result,
            assumptions: engine_assumptions,
            warnings,
        } = output;

        Ok(StageResponse {
            job_id,
            meta: envelope(assumptions, engine_assumptions, warnings),
            result,
        })
    }

    // =============================================================================
    // Detached submissions
    // =============================================================================

    pub fn submit_lyrics(&self, req: LyricsRequest) -> Result<SubmitResponse, CoordinatorError> {
        let Resolved { input, .. } = req.resolve()?;
        let engine = Arc::clone(&self.engines.lyrics);
        self.submit(StageKind::LyricsGenerate, async move {
            engine.generate(&input).await
        })
    }

    pub fn submit_compose(&self, req: ComposeRequest) -> Result<SubmitResponse, CoordinatorError> {
        let Resolved { input, .. } = req.resolve()?;
        let engine = Arc::clone(&self.engines.compose);
        self.submit(StageKind::ComposeGenerate, async move {
            engine.compose(&input).await
        })
    }

    pub fn submit_separate(
        &self,
        req: SeparateRequest,
    ) -> Result<SubmitResponse, CoordinatorError> {
        let Resolved { input, .. } = req.resolve()?;
        let engine = Arc::clone(&self.engines.separation);
        self.submit(StageKind::SeparateVocals, async move {
            engine.separate(&input).await
        })
    }

    pub fn submit_reintegrate(&self, req: MixRequest) -> Result<SubmitResponse, CoordinatorError> {
        let Resolved { input, .. } = req.resolve()?;
        let engine = Arc::clone(&self.engines.reintegration);
        self.submit(StageKind::MixReintegrate, async move {
            engine.reintegrate(&input).await
        })
    }

    fn submit<T, Fut>(&self, kind: StageKind, call: Fut) -> Result<SubmitResponse, CoordinatorError>
    where
        T: Serialize + Send + 'static,
        Fut: Future<Output = EngineResult<T>> + Send + 'static,
    {
        let job_id = self.ledger.create(kind)?;
        let limit = self.engine_timeout;

        self.dispatcher.dispatch(job_id, kind, async move {
            let output = with_timeout(limit, call).await?;
            serde_json::to_value(&output.value).map_err(|e| EngineError::Malformed(e.to_string()))
        });
        tracing::info!("Job {} submitted ({})", job_id, kind);

        Ok(SubmitResponse {
            job_id,
            kind,
            state: JobState::Pending,
        })
    }

    // =============================================================================
    // Plans (no job recorded)
    // =============================================================================

    pub async fn plan_lyrics(
        &self,
        req: LyricsRequest,
    ) -> Result<LyricsPlanResponse, CoordinatorError> {
        let Resolved { input, assumptions } = req.resolve()?;
        let output = self
            .plan(StageKind::LyricsGenerate, self.engines.lyrics.generate(&input))
            .await?;
        Ok(LyricsPlanResponse {
            meta: envelope(assumptions, output.assumptions, output.warnings),
            lyrics_result: output.value,
        })
    }

    pub async fn plan_compose(
        &self,
        req: ComposeRequest,
    ) -> Result<CompositionPlanResponse, CoordinatorError> {
        let Resolved { input, assumptions } = req.resolve()?;
        let output = self
            .plan(StageKind::ComposeGenerate, self.engines.compose.compose(&input))
            .await?;
        Ok(CompositionPlanResponse {
            meta: envelope(assumptions, output.assumptions, output.warnings),
            composition_result: output.value,
        })
    }

    pub async fn plan_separate(
        &self,
        req: SeparateRequest,
    ) -> Result<SeparationPlanResponse, CoordinatorError> {
        let Resolved { input, assumptions } = req.resolve()?;
        let output = self
            .plan(StageKind::SeparateVocals, self.engines.separation.separate(&input))
            .await?;
        Ok(SeparationPlanResponse {
            meta: envelope(assumptions, output.assumptions, output.warnings),
            separation_plan: output.value,
        })
    }

    pub async fn plan_reintegrate(
        &self,
        req: MixRequest,
    ) -> Result<ReintegrationPlanResponse, CoordinatorError> {
        let Resolved { input, assumptions } = req.resolve()?;
        let output = self
            .plan(
                StageKind::MixReintegrate,
                self.engines.reintegration.reintegrate(&input),
            )
            .await?;
        Ok(ReintegrationPlanResponse {
            meta: envelope(assumptions, output.assumptions, output.warnings),
            reintegration_plan: output.value,
        })
    }

    async fn plan<T>(
        &self,
        kind: StageKind,
        call: impl Future<Output = EngineResult<T>>,
    ) -> Result<EngineOutput<T>, CoordinatorError> {
        with_timeout(self.engine_timeout, call).await.map_err(|e| {
            tracing::warn!("{} plan failed: {}", kind, e);
            CoordinatorError::EngineFailure {
                job_id: None,
                kind,
                message: e.public_message(),
            }
        })
    }

    // =============================================================================
    // Status and feedback
    // =============================================================================

    pub fn job_status(&self, job_id: Uuid) -> Result<Job, CoordinatorError> {
        Ok(self.ledger.get(job_id)?)
    }

    pub fn list_jobs(&self) -> Vec<Job> {
        self.ledger.list()
    }

    /// Project assets are held by external storage; only the id is checked here
    pub fn project(&self, project_id: String) -> Result<ProjectSummary, CoordinatorError> {
        let Resolved { input, .. } = ProjectSummary::resolve(project_id)?;
        tracing::debug!("Project {} requested", input.id);
        Ok(input)
    }

    pub fn record_feedback(&self, req: FeedbackRequest) -> Result<Feedback, CoordinatorError> {
        let Resolved { input, .. } = req.resolve()?;
        tracing::info!(
            target = %input.target,
            rating = input.rating,
            project_id = input.project_id.as_deref().unwrap_or("-"),
            "feedback received"
        );
        Ok(input)
    }
}

/// Envelope metadata: validation defaults first, then the engine's own notes
fn envelope(
    mut assumptions: Vec<String>,
    engine_assumptions: Vec<String>,
    warnings: Vec<String>,
) -> ResponseMeta {
    assumptions.extend(engine_assumptions);
    ResponseMeta::new(assumptions, warnings)
}

/// Runs a recorded job's engine call and moves the job to its terminal state
///
/// No ledger lock is held while the engine runs.
async fn settle<T: Serialize>(
    ledger: &Ledger,
    job_id: Uuid,
    kind: StageKind,
    limit: Duration,
    call: impl Future<Output = EngineResult<T>>,
) -> Result<EngineOutput<T>, CoordinatorError> {
    let output = match with_timeout(limit, call).await {
        Ok(output) => output,
        Err(e) => return Err(fail_job(ledger, job_id, kind, e)),
    };

    let value = match serde_json::to_value(&output.value) {
        Ok(value) => value,
        Err(e) => {
            return Err(fail_job(ledger, job_id, kind, EngineError::Malformed(e.to_string())));
        }
    };

    ledger.complete(job_id, value).map_err(ledger_fault)?;
    tracing::info!("Job {} completed ({})", job_id, kind);
    Ok(output)
}

/// Records an engine failure on the job and builds the caller-facing error
fn fail_job(ledger: &Ledger, job_id: Uuid, kind: StageKind, error: EngineError) -> CoordinatorError {
    tracing::warn!("Job {} ({}) failed: {}", job_id, kind, error);

    let message = error.public_message();
    if let Err(e) = ledger.fail(job_id, JobError::engine_failure(message.clone())) {
        return ledger_fault(e);
    }

    CoordinatorError::EngineFailure {
        job_id: Some(job_id),
        kind,
        message,
    }
}

/// The coordinator owns every job it runs, so a rejected transition is a bug
fn ledger_fault(error: LedgerError) -> CoordinatorError {
    tracing::error!("Ledger rejected coordinator update: {}", error);
    debug_assert!(
        !matches!(error, LedgerError::InvalidTransition { .. }),
        "ledger rejected coordinator transition: {error}"
    );
    CoordinatorError::Ledger(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use studio_core::domain::asset::AudioAsset;
    use studio_core::domain::lyrics::LyricsIn;
    use studio_core::dto::stage::LengthRequest;

    use crate::engine::LyricsEngine;

    fn coordinator() -> Coordinator {
        Coordinator::new(
            Arc::new(Ledger::new(1024)),
            Engines::stub(),
            Duration::from_secs(10),
            2,
        )
    }

    fn lyrics_request() -> LyricsRequest {
        LyricsRequest {
            genre: Some("pop".into()),
            mood: Some("joyful".into()),
            length: Some(LengthRequest {
                verses: Some(2),
                choruses: Some(1),
            }),
            prompt: Some("summer love, joy and nostalgia".into()),
        }
    }

    #[tokio::test]
    async fn test_lyrics_scenario() {
        let coordinator = coordinator();
        let response = coordinator.generate_lyrics(lyrics_request()).await.unwrap();

        assert_eq!(response.meta.version, "1.0");
        let result = &response.result;
        let ids: Vec<&str> = result.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["V1", "C1", "V2"]);
        assert_eq!(
            result.constraints.keywords,
            vec!["summer love", "joy and nostalgia"]
        );

        let job = coordinator.job_status(response.job_id).unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.kind, StageKind::LyricsGenerate);
        assert_eq!(job.result, Some(serde_json::to_value(result).unwrap()));
    }

    #[tokio::test]
    async fn test_compose_echoes_music_spec() {
        let coordinator = coordinator();
        let req = ComposeRequest {
            key: Some("A minor".into()),
            tempo_bpm: Some(92),
            style: Some("lofi".into()),
            duration_sec: Some(60),
            instrumentation: Some(vec!["drums".into(), "piano".into()]),
        };
        let response = coordinator.compose(req).await.unwrap();
        let spec = &response.result.music_spec;

        assert_eq!(spec.key, "A minor");
        assert_eq!(spec.tempo_bpm, 92);
        assert_eq!(spec.style, "lofi");
        assert_eq!(spec.duration_sec, 60);
        assert!(!response.result.arrangement.is_empty());
        assert!(response.result.arrangement.iter().all(|s| s.bars > 0));
    }

    #[tokio::test]
    async fn test_defaults_are_reported_as_assumptions() {
        let coordinator = coordinator();
        let response = coordinator
            .compose(ComposeRequest::default())
            .await
            .unwrap();

        let assumptions = &response.meta.assumptions;
        assert!(assumptions.iter().any(|a| a.contains("key")));
        assert!(assumptions.iter().any(|a| a.contains("tempo_bpm")));
        assert!(assumptions.iter().any(|a| a.contains("4/4")));
    }

    #[tokio::test]
    async fn test_validation_failure_creates_no_job() {
        let coordinator = coordinator();
        let req = ComposeRequest {
            tempo_bpm: Some(0),
            duration_sec: Some(-5),
            ..Default::default()
        };

        let err = coordinator.compose(req).await.unwrap_err();
        match err {
            CoordinatorError::Validation(e) => assert_eq!(e.fields.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(coordinator.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_asset_fails_job() {
        let coordinator = coordinator();
        let req = SeparateRequest {
            file: Some(AudioAsset::new("broken.wav", b"not really audio".to_vec())),
        };

        let err = coordinator.separate_vocals(req).await.unwrap_err();
        let job_id = match err {
            CoordinatorError::EngineFailure {
                job_id: Some(id),
                kind,
                ..
            } => {
                assert_eq!(kind, StageKind::SeparateVocals);
                id
            }
            other => panic!("expected engine failure, got {other:?}"),
        };

        let job = coordinator.job_status(job_id).unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.error.unwrap().kind, ErrorKind::EngineFailure);
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let coordinator = coordinator();
        let id = Uuid::new_v4();
        let err = coordinator.job_status(id).unwrap_err();
        assert!(matches!(
            err,
            CoordinatorError::Ledger(LedgerError::NotFound(missing)) if missing == id
        ));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_plan_records_no_job() {
        let coordinator = coordinator();
        let plan = coordinator.plan_lyrics(lyrics_request()).await.unwrap();
        assert_eq!(plan.lyrics_result.title, "Summer Love");
        assert!(coordinator.list_jobs().is_empty());
    }

    #[tokio::test]
    async fn test_detached_submission_completes() {
        let coordinator = coordinator();
        let submitted = coordinator.submit_lyrics(lyrics_request()).unwrap();
        assert_eq!(submitted.state, JobState::Pending);

        let mut job = coordinator.job_status(submitted.job_id).unwrap();
        for _ in 0..200 {
            if job.state.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            job = coordinator.job_status(submitted.job_id).unwrap();
        }
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.result.unwrap()["title"], "Summer Love");
    }

    struct SlowLyrics;

    #[async_trait]
    impl LyricsEngine for SlowLyrics {
        async fn generate(&self, _input: &LyricsIn) -> EngineResult<LyricsResult> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(EngineError::Unavailable("unreachable".into()))
        }
    }

    #[tokio::test]
    async fn test_engine_timeout_fails_job() {
        let mut engines = Engines::stub();
        engines.lyrics = Arc::new(SlowLyrics);
        let coordinator = Coordinator::new(
            Arc::new(Ledger::new(16)),
            engines,
            Duration::from_millis(20),
            1,
        );

        let err = coordinator.generate_lyrics(lyrics_request()).await.unwrap_err();
        let CoordinatorError::EngineFailure {
            job_id: Some(job_id),
            message,
            ..
        } = err
        else {
            panic!("expected engine failure");
        };
        assert!(message.contains("timed out"));
        assert_eq!(
            coordinator.job_status(job_id).unwrap().state,
            JobState::Failed
        );
    }

    #[tokio::test]
    async fn test_status_is_readable_while_engine_runs() {
        let mut engines = Engines::stub();
        engines.lyrics = Arc::new(SlowLyrics);
        let coordinator = Arc::new(Coordinator::new(
            Arc::new(Ledger::new(16)),
            engines,
            Duration::from_secs(5),
            1,
        ));

        let running = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.generate_lyrics(lyrics_request()).await })
        };

        let mut jobs = Vec::new();
        for _ in 0..100 {
            jobs = coordinator.list_jobs();
            if jobs.first().is_some_and(|j| j.state == JobState::Running) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(jobs.len(), 1);
        assert_eq!(
            coordinator.job_status(jobs[0].id).unwrap().state,
            JobState::Running
        );
        running.abort();
    }

    #[tokio::test]
    async fn test_dropped_caller_still_settles_job() {
        let mut engines = Engines::stub();
        engines.lyrics = Arc::new(SlowLyrics);
        let coordinator = Arc::new(Coordinator::new(
            Arc::new(Ledger::new(16)),
            engines,
            Duration::from_millis(200),
            1,
        ));

        let caller = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.generate_lyrics(lyrics_request()).await })
        };

        let mut job_id = None;
        for _ in 0..100 {
            if let Some(job) = coordinator.list_jobs().first()
                && job.state == JobState::Running
            {
                job_id = Some(job.id);
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let job_id = job_id.expect("job never started running");

        // Client disconnect: the handler future is dropped mid-run
        caller.abort();
        assert!(caller.await.unwrap_err().is_cancelled());

        let mut job = coordinator.job_status(job_id).unwrap();
        for _ in 0..200 {
            if job.state.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            job = coordinator.job_status(job_id).unwrap();
        }
        assert_eq!(job.state, JobState::Failed);
        assert!(job.completed_at.is_some());
        assert!(job.error.unwrap().message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_project_summary() {
        let coordinator = coordinator();
        let project = coordinator.project("demo".into()).unwrap();
        assert_eq!(project.id, "demo");
        assert!(project.assets.is_empty());

        let err = coordinator.project(" ".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_feedback_is_echoed() {
        let stored = coordinator()
            .record_feedback(FeedbackRequest {
                target: Some("lyrics".into()),
                rating: Some(4),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(stored.rating, 4);
    }
}
