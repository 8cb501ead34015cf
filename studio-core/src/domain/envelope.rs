//! Response envelope shared by every stage response

use serde::{Deserialize, Serialize};

/// Version tag stamped on every envelope
pub const ENVELOPE_VERSION: &str = "1.0";

/// Uniform metadata attached to stage output
///
/// Built by the coordinator, never by an engine, so every stage exposes the
/// same surface regardless of which engine produced the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub assumptions: Vec<String>,
    pub warnings: Vec<String>,
}

impl ResponseMeta {
    pub fn new(assumptions: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            assumptions,
            warnings,
        }
    }
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}
