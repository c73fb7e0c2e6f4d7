use fincoach_core::{ContextMap, HandoffPriority};
use fincoach_pipeline::RoutingDecision;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// === HTTP DTOs ===

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub session_id: String,
    pub message: String,
    /// Structured session facts forwarded to the worker's system prompt.
    #[serde(default)]
    pub context: ContextMap,
    /// Pin the turn to a named worker, bypassing routing.
    pub worker: Option<String>,
    /// Pre-computed routing decision from an upstream reasoning step.
    pub decision: Option<RoutingDecision>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub worker: String,
    pub response: String,
    pub elapsed_ms: u64,
}

fn empty_params() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize)]
pub struct ToolInvokeRequest {
    #[serde(default = "empty_params")]
    pub params: Value,
    pub user_id: String,
    pub session_id: String,
    #[serde(default)]
    pub authenticated: bool,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct HandoffHttpRequest {
    pub from_worker: String,
    pub to_worker: String,
    pub user_id: String,
    pub session_id: String,
    pub reason: String,
    #[serde(default)]
    pub priority: HandoffPriority,
    #[serde(default)]
    pub context_payload: ContextMap,
    pub user_message: String,
    #[serde(default)]
    pub preserve_history: bool,
    #[serde(default)]
    pub escalation_level: u32,
}

// === WebSocket DTOs ===

#[derive(Debug, Deserialize)]
pub struct WsPayload {
    pub uuid: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub context: ContextMap,
    #[serde(default)]
    pub init: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WsResponse {
    Stream {
        on_chat_model_stream: String,
        worker: String,
    },
    End {
        on_chat_model_end: bool,
        elapsed_ms: u64,
    },
}

impl WsResponse {
    pub fn stream(worker: &str, content: &str) -> Self {
        Self::Stream {
            on_chat_model_stream: content.to_string(),
            worker: worker.to_string(),
        }
    }

    pub fn end(elapsed_ms: u64) -> Self {
        Self::End {
            on_chat_model_end: true,
            elapsed_ms,
        }
    }
}
