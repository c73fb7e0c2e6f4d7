use serde::{Deserialize, Serialize};

use crate::types::ContextMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HandoffPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// A request to transfer an in-flight user task from one worker to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffRequest {
    pub from_worker: String,
    pub to_worker: String,
    pub user_id: String,
    pub session_id: String,
    pub reason: String,
    #[serde(default)]
    pub priority: HandoffPriority,
    /// Structured data merged into the target worker's context. Keys here
    /// win over the caller's current context on collision.
    #[serde(default)]
    pub context_payload: ContextMap,
    pub user_message: String,
    #[serde(default)]
    pub preserve_history: bool,
    /// Incremented by the caller each time a handoff loop repeats.
    #[serde(default)]
    pub escalation_level: u32,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffResult {
    pub success: bool,
    /// Assigned on every attempt, success or not, for traceability.
    pub handoff_id: String,
    pub from_worker: String,
    pub to_worker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub context_preserved: bool,
    pub escalation_triggered: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
