use std::sync::Arc;

use axum::{extract::State, Json};
use fincoach_core::MessageRole;

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::AppError;
use crate::state::AppState;

/// One coaching turn. The conversation key is user plus session so two
/// sessions of the same user do not share history.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::bad_request("message must not be empty"));
    }

    let conversation_key = format!("{}:{}", req.user_id, req.session_id);
    let history = state.get_conversation(&conversation_key);
    state.add_message(&conversation_key, MessageRole::User, &req.message);

    let reply = match &req.worker {
        Some(worker) => {
            state
                .orchestrator
                .invoke_worker(worker, &req.message, &req.context, &history)
                .await?
        }
        None => {
            state
                .orchestrator
                .converse(&req.message, &req.context, &history, req.decision.as_ref())
                .await?
        }
    };

    state.add_message(&conversation_key, MessageRole::Assistant, &reply.content);

    Ok(Json(ChatResponse {
        worker: reply.worker,
        response: reply.content,
        elapsed_ms: reply.elapsed_ms,
    }))
}
