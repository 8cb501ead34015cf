//! Project summaries
//!
//! Audio assets are kept in external storage, so a project summary only
//! carries what the orchestrator itself knows about the project.

use serde::{Deserialize, Serialize};

use crate::validation::{Resolved, ValidationError, Validator};

const MAX_PROJECT_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    /// Asset references; empty until a storage backend is attached
    pub assets: Vec<String>,
    pub status: String,
}

impl ProjectSummary {
    /// Summary of a project with no stored assets
    pub fn resolve(project_id: String) -> Result<Resolved<Self>, ValidationError> {
        let mut v = Validator::new();
        let id = v.text("project_id", Some(project_id), "", MAX_PROJECT_ID_LEN);
        v.finish(Self {
            id,
            assets: Vec::new(),
            status: "ok".to_string(),
        })
    }
}
