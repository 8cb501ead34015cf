//! Feedback DTOs

use serde::{Deserialize, Serialize};

use crate::domain::feedback::Feedback;
use crate::validation::{Resolved, ValidationError, Validator};

/// Body of `POST /v1/feedback`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl FeedbackRequest {
    pub fn resolve(self) -> Result<Resolved<Feedback>, ValidationError> {
        let mut v = Validator::new();

        let project_id = v.optional_text("project_id", self.project_id, 128);
        let target = match v.optional_text("target", self.target, 128) {
            Some(target) => target,
            None => {
                v.reject("target", "is required");
                String::new()
            }
        };
        let rating = match self.rating {
            Some(rating) if (1..=5).contains(&rating) => rating as u8,
            Some(_) => {
                v.reject("rating", "must be between 1 and 5");
                0
            }
            None => {
                v.reject("rating", "is required");
                0
            }
        };
        let reason = v.optional_text("reason", self.reason, 2000);

        v.finish(Feedback {
            project_id,
            target,
            rating,
            reason,
            meta: self.meta,
        })
    }
}

/// Acknowledgement returned after feedback is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAck {
    pub ok: bool,
    pub stored: Feedback,
}
