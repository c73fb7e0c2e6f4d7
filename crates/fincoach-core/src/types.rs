use serde::{Deserialize, Serialize};

/// Roles the fixed worker set covers. Every running registry must contain
/// at least one worker per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkerRole {
    Budgeting,
    Analysis,
    Insight,
    General,
}

impl WorkerRole {
    pub fn all() -> [WorkerRole; 4] {
        [
            WorkerRole::Budgeting,
            WorkerRole::Analysis,
            WorkerRole::Insight,
            WorkerRole::General,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Arbitrary structured context threaded through worker turns and handoffs.
pub type ContextMap = serde_json::Map<String, serde_json::Value>;
