//! Health check endpoint

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::service::Coordinator;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub jobs: usize,
}

/// GET /health
pub async fn health_check(State(coordinator): State<Arc<Coordinator>>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        jobs: coordinator.ledger().len(),
    })
}
