//! # Health Check Handler

use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status:         String,
    pub uptime_seconds: u64,
}

pub async fn health_inner(state: &AppState) -> Json<HealthResponse> {
    Json(HealthResponse {
        status:         "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
