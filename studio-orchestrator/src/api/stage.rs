//! Stage API Handlers
//!
//! One endpoint per pipeline stage. By default the stage runs to completion
//! and the response carries the job id, envelope and result. With
//! `?mode=detached` the job is queued and `202 Accepted` is returned at once;
//! callers then poll `/v1/jobs/{job_id}/status`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Multipart, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use studio_core::dto::stage::{ComposeRequest, LyricsRequest};

use crate::api::error::ApiResult;
use crate::api::upload::UploadForm;
use crate::service::Coordinator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Sync,
    Detached,
}

#[derive(Debug, Default, Deserialize)]
pub struct StageQuery {
    #[serde(default)]
    pub mode: RunMode,
}

fn run_mode(query: Result<Query<StageQuery>, QueryRejection>) -> ApiResult<RunMode> {
    let Query(query) = query?;
    Ok(query.mode)
}

fn accepted<T: serde::Serialize>(body: T) -> Response {
    (StatusCode::ACCEPTED, Json(body)).into_response()
}

/// POST /v1/lyrics.generate
pub async fn generate_lyrics(
    State(coordinator): State<Arc<Coordinator>>,
    query: Result<Query<StageQuery>, QueryRejection>,
    payload: Result<Json<LyricsRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let mode = run_mode(query)?;
    let Json(req) = payload?;
    tracing::info!("lyrics.generate requested ({:?})", mode);

    Ok(match mode {
        RunMode::Sync => Json(coordinator.generate_lyrics(req).await?).into_response(),
        RunMode::Detached => accepted(coordinator.submit_lyrics(req)?),
    })
}

/// POST /v1/compose.generate
pub async fn compose(
    State(coordinator): State<Arc<Coordinator>>,
    query: Result<Query<StageQuery>, QueryRejection>,
    payload: Result<Json<ComposeRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let mode = run_mode(query)?;
    let Json(req) = payload?;
    tracing::info!("compose.generate requested ({:?})", mode);

    Ok(match mode {
        RunMode::Sync => Json(coordinator.compose(req).await?).into_response(),
        RunMode::Detached => accepted(coordinator.submit_compose(req)?),
    })
}

/// POST /v1/separate.vocals
/// Multipart field: `file`
pub async fn separate_vocals(
    State(coordinator): State<Arc<Coordinator>>,
    query: Result<Query<StageQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let mode = run_mode(query)?;
    let req = UploadForm::read(multipart?).await?.into_separate_request();
    tracing::info!("separate.vocals requested ({:?})", mode);

    Ok(match mode {
        RunMode::Sync => Json(coordinator.separate_vocals(req).await?).into_response(),
        RunMode::Detached => accepted(coordinator.submit_separate(req)?),
    })
}

/// POST /v1/mix.reintegrate
/// Multipart fields: `instrumental`, `vocals`, `key`, `tempo_bpm`, `preset`
pub async fn reintegrate(
    State(coordinator): State<Arc<Coordinator>>,
    query: Result<Query<StageQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let mode = run_mode(query)?;
    let req = UploadForm::read(multipart?).await?.into_mix_request();
    tracing::info!("mix.reintegrate requested ({:?})", mode);

    Ok(match mode {
        RunMode::Sync => Json(coordinator.reintegrate(req).await?).into_response(),
        RunMode::Detached => accepted(coordinator.submit_reintegrate(req)?),
    })
}
