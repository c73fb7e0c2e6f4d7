use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use fincoach_core::{
    AgentError, ChatOptions, ChatProvider, ContextMap, Message, WorkerRole,
};
use fincoach_tools::{ExecutionContext, ToolExecutionResult, ToolRegistry};
use serde::Serialize;
use tracing::info;

use crate::config::WorkerConfig;

#[derive(Debug, Clone, Serialize)]
pub struct WorkerReply {
    pub worker: String,
    pub content: String,
    pub elapsed_ms: u64,
}

/// One configured conversational worker.
///
/// Constructed in phase one of registry initialization; its handoff
/// targets are wired in phase two, once every worker exists by name.
/// A worker counts as initialized only after that wiring.
pub struct Worker {
    config: WorkerConfig,
    provider: Arc<dyn ChatProvider>,
    tools: Arc<ToolRegistry>,
    active: AtomicBool,
    handoff_targets: OnceLock<Vec<String>>,
}

impl Worker {
    pub(crate) fn new(
        config: WorkerConfig,
        provider: Arc<dyn ChatProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Result<Self, AgentError> {
        if config.name.trim().is_empty() {
            return Err(AgentError::Config("worker name must not be empty".into()));
        }
        if config.instructions.trim().is_empty() {
            return Err(AgentError::Config(format!(
                "worker {} has empty instructions",
                config.name
            )));
        }

        let active = AtomicBool::new(config.active);
        Ok(Self {
            config,
            provider,
            tools,
            active,
            handoff_targets: OnceLock::new(),
        })
    }

    /// Targets as declared in configuration, before phase-two wiring.
    pub(crate) fn declared_targets(&self) -> &[String] {
        &self.config.handoff_targets
    }

    pub(crate) fn wire_targets(&self, targets: Vec<String>) {
        // Second-phase wiring; ignored if init is somehow re-run.
        let _ = self.handoff_targets.set(targets);
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn role(&self) -> WorkerRole {
        self.config.role
    }

    pub fn priority(&self) -> u32 {
        self.config.priority
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    pub fn is_initialized(&self) -> bool {
        self.handoff_targets.get().is_some()
    }

    pub fn handoff_targets(&self) -> &[String] {
        self.handoff_targets.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn can_hand_off_to(&self, target: &str) -> bool {
        self.handoff_targets().iter().any(|t| t == target)
    }

    pub fn allowed_tools(&self) -> &[String] {
        &self.config.allowed_tools
    }

    /// One conversational turn: base instructions plus serialized session
    /// context as the system prompt, bounded by the configured turn timeout.
    pub async fn respond(
        &self,
        message: &str,
        context: &ContextMap,
        history: &[Message],
    ) -> Result<WorkerReply, AgentError> {
        let system_prompt = self.build_system_prompt(context)?;
        let options = ChatOptions {
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        };

        info!("{}: handling turn", self.config.name);
        let started = Instant::now();

        let content = match tokio::time::timeout(
            Duration::from_millis(self.config.turn_timeout_ms),
            self.provider
                .converse(&system_prompt, message, history, &options),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(AgentError::Timeout(self.config.turn_timeout_ms)),
        };

        Ok(WorkerReply {
            worker: self.config.name.clone(),
            content,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Execute a tool through the shared registry, restricted to this
    /// worker's permitted subset. Denial comes back as a failed result,
    /// matching the registry's never-raise policy.
    pub async fn execute_tool(
        &self,
        name: &str,
        params: serde_json::Value,
        ctx: &ExecutionContext,
    ) -> ToolExecutionResult {
        if !self.config.allowed_tools.iter().any(|t| t == name) {
            return ToolExecutionResult::err(
                &AgentError::Validation(format!(
                    "Tool {} is not permitted for worker {}",
                    name, self.config.name
                )),
                0,
            );
        }
        self.tools.execute(name, params, ctx).await
    }

    fn build_system_prompt(&self, context: &ContextMap) -> Result<String, AgentError> {
        if context.is_empty() {
            return Ok(self.config.instructions.clone());
        }
        let serialized = serde_json::to_string_pretty(context)?;
        Ok(format!(
            "{}\n\nSession context:\n{}",
            self.config.instructions, serialized
        ))
    }
}
