//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The pipeline stage a job was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    #[serde(rename = "lyrics.generate")]
    LyricsGenerate,
    #[serde(rename = "compose.generate")]
    ComposeGenerate,
    #[serde(rename = "separate.vocals")]
    SeparateVocals,
    #[serde(rename = "mix.reintegrate")]
    MixReintegrate,
}

impl StageKind {
    pub const ALL: [StageKind; 4] = [
        StageKind::LyricsGenerate,
        StageKind::ComposeGenerate,
        StageKind::SeparateVocals,
        StageKind::MixReintegrate,
    ];

    /// Wire name of the stage, also used as the route suffix
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::LyricsGenerate => "lyrics.generate",
            StageKind::ComposeGenerate => "compose.generate",
            StageKind::SeparateVocals => "separate.vocals",
            StageKind::MixReintegrate => "mix.reintegrate",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job lifecycle state
///
/// `pending -> running -> {completed, failed}`. A job may also go straight
/// from `pending` to a terminal state when its stage never reports running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Pending, JobState::Running)
                | (JobState::Pending, JobState::Completed)
                | (JobState::Pending, JobState::Failed)
                | (JobState::Running, JobState::Completed)
                | (JobState::Running, JobState::Failed)
        )
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Error taxonomy shared by the ledger, the coordinator and the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    InvalidTransition,
    EngineFailure,
    ResourceExhausted,
}

/// Structured failure recorded on a failed job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub kind: ErrorKind,
    pub message: String,
}

impl JobError {
    pub fn engine_failure(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::EngineFailure,
            message: message.into(),
        }
    }
}

/// Job record
///
/// Owned by the ledger; everything outside it only ever sees snapshots.
/// `result` is present only when completed, `error` only when failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub kind: StageKind,
    pub state: JobState,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
}

impl Job {
    /// A fresh pending job
    pub fn new(id: Uuid, kind: StageKind) -> Self {
        Self {
            id,
            kind,
            state: JobState::Pending,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_wire_names() {
        for kind in StageKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
        }

        let parsed: StageKind = serde_json::from_str("\"mix.reintegrate\"").unwrap();
        assert_eq!(parsed, StageKind::MixReintegrate);
    }

    #[test]
    fn test_state_machine_transitions() {
        use JobState::*;

        assert!(Pending.can_transition_to(Running));
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Failed));

        assert!(!Running.can_transition_to(Running));
        assert!(!Running.can_transition_to(Pending));
        for terminal in [Completed, Failed] {
            assert!(terminal.is_terminal());
            for next in [Pending, Running, Completed, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_pending_job_serializes_without_outcome() {
        let job = Job::new(Uuid::new_v4(), StageKind::LyricsGenerate);
        let json = serde_json::to_value(&job).unwrap();

        assert_eq!(json["state"], "pending");
        assert_eq!(json["kind"], "lyrics.generate");
        assert!(json.get("result").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("completed_at").is_none());
    }

    #[test]
    fn test_job_error_kind_is_snake_case() {
        let err = JobError::engine_failure("corrupt media");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "engine_failure");
        assert_eq!(json["message"], "corrupt media");
    }
}
