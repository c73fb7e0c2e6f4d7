use std::sync::Arc;

use async_trait::async_trait;
use fincoach_core::{AgentError, ErrorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Budgeting,
    Transactions,
    Insights,
    Account,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// The registered behavior behind a tool name.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn run(
        &self,
        params: serde_json::Value,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, AgentError>;
}

/// Per-call execution context supplied by the invoking worker or handler.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub user_id: String,
    pub session_id: String,
    pub authenticated: bool,
    /// Hard deadline for the executor. Unbounded when absent.
    pub timeout_ms: Option<u64>,
}

#[derive(Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub category: ToolCategory,
    /// JSON Schema (draft 7) the input parameters must satisfy.
    pub parameter_schema: serde_json::Value,
    pub requires_auth: bool,
    pub risk_level: RiskLevel,
    pub estimated_duration_ms: u64,
    pub executor: Arc<dyn ToolExecutor>,
}

/// Serializable listing of a tool, without its executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub category: ToolCategory,
    pub parameter_schema: serde_json::Value,
    pub requires_auth: bool,
    pub risk_level: RiskLevel,
    pub estimated_duration_ms: u64,
}

impl From<&ToolDefinition> for ToolSpec {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            category: def.category,
            parameter_schema: def.parameter_schema.clone(),
            requires_auth: def.requires_auth,
            risk_level: def.risk_level,
            estimated_duration_ms: def.estimated_duration_ms,
        }
    }
}

/// Outcome of a single tool execution. Never persisted by the registry;
/// the caller decides what, if anything, to log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub duration_ms: u64,
}

impl ToolExecutionResult {
    pub fn ok(result: serde_json::Value, duration_ms: u64) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            error_kind: None,
            duration_ms,
        }
    }

    pub fn err(error: &AgentError, duration_ms: u64) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            duration_ms,
        }
    }
}
