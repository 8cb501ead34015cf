//! Feedback API Handler

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use studio_core::dto::feedback::{FeedbackAck, FeedbackRequest};

use crate::api::error::ApiResult;
use crate::service::Coordinator;

/// POST /v1/feedback
/// Accept a rating for generated material
pub async fn submit_feedback(
    State(coordinator): State<Arc<Coordinator>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<Json<FeedbackAck>> {
    let Json(req) = payload?;
    let stored = coordinator.record_feedback(req)?;
    Ok(Json(FeedbackAck { ok: true, stored }))
}
