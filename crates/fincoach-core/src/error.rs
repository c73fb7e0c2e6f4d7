use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Worker not found: {0}")]
    WorkerNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Execution timeout after {0}ms")]
    Timeout(u64),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("Failed to parse structured output: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Parse(err.to_string())
    }
}

/// Coarse failure category carried inside structured results so callers can
/// branch without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Timeout,
    DependencyUnavailable,
    Execution,
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::WorkerNotFound(_) | AgentError::ToolNotFound(_) => ErrorKind::NotFound,
            AgentError::Validation(_) | AgentError::Config(_) => ErrorKind::Validation,
            AgentError::Timeout(_) => ErrorKind::Timeout,
            AgentError::DependencyUnavailable(_) => ErrorKind::DependencyUnavailable,
            AgentError::Execution(_) | AgentError::Llm(_) | AgentError::Parse(_) => {
                ErrorKind::Execution
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_taxonomy() {
        assert_eq!(
            AgentError::ToolNotFound("x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(AgentError::Timeout(100).kind(), ErrorKind::Timeout);
        assert_eq!(
            AgentError::Validation("bad".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            AgentError::Llm("boom".into()).kind(),
            ErrorKind::Execution
        );
    }

    #[test]
    fn timeout_message_names_the_deadline() {
        let msg = AgentError::Timeout(100).to_string();
        assert!(msg.contains("timeout"));
        assert!(msg.contains("100ms"));
    }
}
