use std::sync::Arc;

use axum::{extract::State, Json};
use fincoach_core::{HandoffRequest, HandoffResult, Message};
use serde_json::json;

use crate::dto::HandoffHttpRequest;
use crate::state::AppState;

/// Explicit worker-to-worker transfer. Like tool invocation this always
/// answers 200: failures are carried in the result body.
pub async fn handoff(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HandoffHttpRequest>,
) -> Json<HandoffResult> {
    let conversation_key = format!("{}:{}", req.user_id, req.session_id);
    let history: Vec<Message> = state.get_conversation(&conversation_key);

    // The running conversation rides along as the caller's context so the
    // manager can decide whether it survived the merge.
    let mut current_context = fincoach_core::ContextMap::new();
    if !history.is_empty() {
        if let Ok(value) = serde_json::to_value(&history) {
            current_context.insert("history".into(), value);
        }
    }

    let request = HandoffRequest {
        from_worker: req.from_worker,
        to_worker: req.to_worker,
        user_id: req.user_id,
        session_id: req.session_id,
        reason: req.reason,
        priority: req.priority,
        context_payload: req.context_payload,
        user_message: req.user_message,
        preserve_history: req.preserve_history,
        escalation_level: req.escalation_level,
        metadata: json!({}),
    };

    Json(
        state
            .orchestrator
            .execute_handoff(request, current_context)
            .await,
    )
}
