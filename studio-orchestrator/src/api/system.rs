//! System and project endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use studio_core::domain::project::ProjectSummary;
use studio_core::domain::prompt::SYSTEM_PROMPT;
use studio_core::dto::response::SystemPromptResponse;

use crate::api::error::ApiResult;
use crate::service::Coordinator;

/// GET /v1/system.prompt
pub async fn system_prompt() -> Json<SystemPromptResponse> {
    Json(SystemPromptResponse {
        prompt: SYSTEM_PROMPT.to_string(),
    })
}

/// GET /v1/projects/{project_id}
pub async fn get_project(
    State(coordinator): State<Arc<Coordinator>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<ProjectSummary>> {
    let Path(project_id) = path?;
    Ok(Json(coordinator.project(project_id)?))
}
