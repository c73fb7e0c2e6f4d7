use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use fincoach_core::MessageRole;
use futures::{SinkExt, StreamExt};
use tracing::{error, info};

use crate::dto::{WsPayload, WsResponse};
use crate::state::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut user_uuid: Option<String> = None;

    while let Some(Ok(msg)) = receiver.next().await {
        let Message::Text(text) = msg else {
            continue;
        };

        let payload: WsPayload = match serde_json::from_str(&text) {
            Ok(p) => p,
            Err(e) => {
                error!("JSON parse error: {}", e);
                continue;
            }
        };

        if let Some(uuid) = &payload.uuid {
            user_uuid = Some(uuid.clone());
        }

        if payload.init {
            info!("Initialized connection for {:?}", user_uuid);
            continue;
        }

        let Some(message) = payload.message else {
            continue;
        };

        let uuid = user_uuid.clone().unwrap_or_else(|| "anonymous".to_string());
        info!(
            "Processing message from {}: {}...",
            uuid,
            preview(&message, 50)
        );

        let history = state.get_conversation(&uuid);
        state.add_message(&uuid, MessageRole::User, &message);

        let (worker, response, elapsed_ms) = match state
            .orchestrator
            .converse(&message, &payload.context, &history, None)
            .await
        {
            Ok(reply) => (reply.worker, reply.content, reply.elapsed_ms),
            Err(e) => {
                error!("Turn failed for {}: {}", uuid, e);
                (
                    String::new(),
                    "Sorry, something went wrong generating a response.".to_string(),
                    0,
                )
            }
        };

        state.add_message(&uuid, MessageRole::Assistant, &response);

        let stream_msg = serde_json::to_string(&WsResponse::stream(&worker, &response)).unwrap();
        let end_msg = serde_json::to_string(&WsResponse::end(elapsed_ms)).unwrap();

        if sender.send(Message::Text(stream_msg.into())).await.is_err() {
            break;
        }
        if sender.send(Message::Text(end_msg.into())).await.is_err() {
            break;
        }
    }

    if let Some(uuid) = user_uuid {
        info!("Connection closed for {}", uuid);
    }
}

/// Truncate a log preview at most `max` bytes, backing up to the nearest
/// character boundary so multi-byte input cannot panic the slice.
fn preview(message: &str, max: usize) -> &str {
    if message.len() <= max {
        return message;
    }
    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}
