use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use fincoach_tools::{ExecutionContext, ToolExecutionResult, ToolSpec};

use crate::dto::ToolInvokeRequest;
use crate::state::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<ToolSpec>> {
    Json(state.orchestrator.tools().all_tools())
}

/// Direct tool invocation. The registry never raises, so this handler
/// always answers 200 with a structured result; callers branch on
/// `success` and `error_kind`.
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<ToolInvokeRequest>,
) -> Json<ToolExecutionResult> {
    let ctx = ExecutionContext {
        user_id: req.user_id,
        session_id: req.session_id,
        authenticated: req.authenticated,
        timeout_ms: req.timeout_ms,
    };
    Json(state.orchestrator.execute_tool(&name, req.params, &ctx).await)
}
