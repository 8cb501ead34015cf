//! Job API Handlers
//!
//! Read-only views of the job ledger.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use studio_core::domain::job::Job;
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::service::Coordinator;

/// GET /v1/jobs/{job_id}/status
/// Snapshot of a single job
pub async fn get_job_status(
    State(coordinator): State<Arc<Coordinator>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Job>> {
    let Path(job_id) = path?;
    tracing::debug!("Getting status of job: {}", job_id);

    let job = coordinator.job_status(job_id)?;
    Ok(Json(job))
}

/// GET /v1/jobs
/// Snapshots of every job, oldest first
pub async fn list_jobs(State(coordinator): State<Arc<Coordinator>>) -> Json<Vec<Job>> {
    tracing::debug!("Listing all jobs");
    Json(coordinator.list_jobs())
}
