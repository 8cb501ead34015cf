//! Plan API Handlers
//!
//! Same engines as the stage endpoints, but no job is recorded and the
//! output sits under a stage-specific key next to the envelope.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
};
use studio_core::dto::response::{
    CompositionPlanResponse, LyricsPlanResponse, ReintegrationPlanResponse,
    SeparationPlanResponse,
};
use studio_core::dto::stage::{ComposeRequest, LyricsRequest};

use crate::api::error::ApiResult;
use crate::api::upload::UploadForm;
use crate::service::Coordinator;

/// POST /v1/ai/lyrics
pub async fn plan_lyrics(
    State(coordinator): State<Arc<Coordinator>>,
    payload: Result<Json<LyricsRequest>, JsonRejection>,
) -> ApiResult<Json<LyricsPlanResponse>> {
    let Json(req) = payload?;
    Ok(Json(coordinator.plan_lyrics(req).await?))
}

/// POST /v1/ai/compose
pub async fn plan_compose(
    State(coordinator): State<Arc<Coordinator>>,
    payload: Result<Json<ComposeRequest>, JsonRejection>,
) -> ApiResult<Json<CompositionPlanResponse>> {
    let Json(req) = payload?;
    Ok(Json(coordinator.plan_compose(req).await?))
}

/// POST /v1/ai/separate
pub async fn plan_separate(
    State(coordinator): State<Arc<Coordinator>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<SeparationPlanResponse>> {
    let req = UploadForm::read(multipart?).await?.into_separate_request();
    Ok(Json(coordinator.plan_separate(req).await?))
}

/// POST /v1/ai/reintegrate
pub async fn plan_reintegrate(
    State(coordinator): State<Arc<Coordinator>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ReintegrationPlanResponse>> {
    let req = UploadForm::read(multipart?).await?.into_mix_request();
    Ok(Json(coordinator.plan_reintegrate(req).await?))
}
