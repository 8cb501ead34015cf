//! Response DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::compose::CompositionResult;
use crate::domain::envelope::ResponseMeta;
use crate::domain::job::{ErrorKind, JobState, StageKind};
use crate::domain::lyrics::LyricsResult;
use crate::domain::reintegrate::ReintegrationPlan;
use crate::domain::separate::SeparationPlan;
use crate::validation::FieldError;

/// Response of a stage endpoint run to completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResponse<T> {
    pub job_id: Uuid,
    pub meta: ResponseMeta,
    pub result: T,
}

/// Response of a stage endpoint run in detached mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub kind: StageKind,
    pub state: JobState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricsPlanResponse {
    pub meta: ResponseMeta,
    pub lyrics_result: LyricsResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionPlanResponse {
    pub meta: ResponseMeta,
    pub composition_result: CompositionResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeparationPlanResponse {
    pub meta: ResponseMeta,
    pub separation_plan: SeparationPlan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReintegrationPlanResponse {
    pub meta: ResponseMeta,
    pub reintegration_plan: ReintegrationPlan,
}

/// Response of `GET /v1/system.prompt`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPromptResponse {
    pub prompt: String,
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
}
