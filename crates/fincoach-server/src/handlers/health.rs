use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use fincoach_core::SystemHealthReport;
use fincoach_workers::WorkerStatus;

use crate::error::AppError;
use crate::state::AppState;

/// Plain liveness probe; cheap enough for a load balancer to hammer.
pub async fn liveness() -> &'static str {
    "OK"
}

/// Full probe of workers, critical tools, and external dependencies.
pub async fn system(State(state): State<Arc<AppState>>) -> Json<SystemHealthReport> {
    Json(state.orchestrator.system_health().await)
}

pub async fn workers(
    State(state): State<Arc<AppState>>,
) -> Json<HashMap<String, WorkerStatus>> {
    Json(state.orchestrator.worker_health(None))
}

pub async fn worker(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<WorkerStatus>, AppError> {
    state
        .orchestrator
        .worker_health(Some(&name))
        .remove(&name)
        .map(Json)
        .ok_or_else(|| fincoach_core::AgentError::WorkerNotFound(name).into())
}
