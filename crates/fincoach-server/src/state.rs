use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use fincoach_core::{ChatProvider, Message, MessageRole, PersistenceStore};
use fincoach_llm::OpenAiProvider;
use fincoach_pipeline::{HealthMonitorConfig, Orchestrator};
use fincoach_tools::builtin::{self, register_builtin_tools};
use fincoach_tools::ToolRegistry;
use fincoach_workers::{default_workers, WorkerRegistry};
use serde_json::json;

use crate::store::{KeywordCategorizer, MemoryStore};

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub conversations: DashMap<String, Vec<Message>>,
}

impl AppState {
    /// Composition root. Registry construction failures are configuration
    /// errors and abort startup.
    pub fn new() -> Result<Self> {
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let chat: Arc<dyn ChatProvider> = Arc::new(OpenAiProvider::new(&model));
        let store: Arc<dyn PersistenceStore> = Arc::new(MemoryStore::new());

        let tools = Arc::new(ToolRegistry::new());
        register_builtin_tools(&tools, store.clone(), Arc::new(KeywordCategorizer))
            .context("registering built-in tools")?;

        let registry = Arc::new(
            WorkerRegistry::initialize(default_workers(), chat.clone(), tools.clone())
                .context("initializing worker registry")?,
        );

        let health_config = HealthMonitorConfig {
            critical_tools: vec![(
                builtin::SPENDING_SUMMARY.to_string(),
                json!({ "period": "week" }),
            )],
            ..Default::default()
        };

        let orchestrator = Orchestrator::new(registry, tools, chat, store, health_config);

        Ok(Self {
            orchestrator,
            conversations: DashMap::new(),
        })
    }

    pub fn get_conversation(&self, uuid: &str) -> Vec<Message> {
        self.conversations
            .get(uuid)
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    pub fn add_message(&self, uuid: &str, role: MessageRole, content: &str) {
        self.conversations
            .entry(uuid.to_string())
            .or_default()
            .push(Message {
                role,
                content: content.to_string(),
            });
    }
}
