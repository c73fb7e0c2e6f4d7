//! Tool registry: named executable tools with declared parameter schemas,
//! capability categories, risk levels, timeout enforcement, and per-tool
//! execution metrics.
//!
//! Execution never raises: every failure mode is represented in the
//! returned [`ToolExecutionResult`], so a worker turn can attempt many
//! tool calls without per-call error handling.

pub mod builtin;
pub mod definition;
pub mod metrics;
pub mod registry;
mod validation;

pub use definition::{
    ExecutionContext, RiskLevel, ToolCategory, ToolDefinition, ToolExecutionResult, ToolExecutor,
    ToolSpec,
};
pub use metrics::ToolMetrics;
pub use registry::ToolRegistry;
