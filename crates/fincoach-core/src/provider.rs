//! Traits for the external collaborators the orchestration core calls.
//!
//! Implementations live outside this crate: the chat provider in
//! fincoach-llm, persistence and categorization in whatever hosts the
//! composition root. Tests substitute scripted implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::types::Message;

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// One completion turn: system prompt + prior history + user message.
    async fn converse(
        &self,
        system_prompt: &str,
        user_message: &str,
        history: &[Message],
        options: &ChatOptions,
    ) -> Result<String, AgentError>;

    /// Trivial round-trip used by the health monitor.
    async fn ping(&self) -> Result<(), AgentError>;
}

/// Opaque async record store for user financial data. The core only reads
/// and writes JSON values by key and pings it for health checks.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, AgentError>;

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), AgentError>;

    async fn ping(&self) -> Result<(), AgentError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub envelope: String,
    /// 0.0–1.0
    pub confidence: f64,
    /// Which heuristic produced this (e.g. "mcc", "keyword").
    pub source: String,
}

/// MCC/keyword categorization heuristics, implemented elsewhere and
/// invoked only by the transaction-categorization tool.
#[async_trait]
pub trait CategorizationHeuristics: Send + Sync {
    async fn suggest(
        &self,
        transaction: &serde_json::Value,
        envelopes: &[String],
    ) -> Result<Vec<CategorySuggestion>, AgentError>;
}
