use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use fincoach_core::{
    AgentError, ChatProvider, ContextMap, HandoffRequest, HandoffResult, Message,
    PersistenceStore, SystemHealthReport,
};
use fincoach_tools::{ExecutionContext, ToolExecutionResult, ToolRegistry};
use fincoach_workers::{WorkerRegistry, WorkerReply, WorkerStatus};
use tracing::info;

use crate::handoff::HandoffManager;
use crate::health::{HealthMonitor, HealthMonitorConfig};
use crate::router::{Router, RoutingDecision};

/// Single entry point the transport layer talks to. Wires the registries,
/// router, handoff manager, and health monitor together over one shared
/// worker registry so their metrics agree.
pub struct Orchestrator {
    registry: Arc<WorkerRegistry>,
    tools: Arc<ToolRegistry>,
    router: Router,
    handoffs: HandoffManager,
    health: Arc<HealthMonitor>,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<WorkerRegistry>,
        tools: Arc<ToolRegistry>,
        chat: Arc<dyn ChatProvider>,
        store: Arc<dyn PersistenceStore>,
        health_config: HealthMonitorConfig,
    ) -> Self {
        let router = Router::new(registry.clone());
        let handoffs = HandoffManager::new(registry.clone());
        let health = Arc::new(HealthMonitor::new(
            registry.clone(),
            tools.clone(),
            chat,
            store,
            health_config,
        ));
        Self {
            registry,
            tools,
            router,
            handoffs,
            health,
        }
    }

    pub fn registry(&self) -> &Arc<WorkerRegistry> {
        &self.registry
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn health_monitor(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    pub fn route(&self, message: &str, decision: Option<&RoutingDecision>) -> String {
        self.router.route(message, decision)
    }

    /// Route a message and run the selected worker's turn.
    pub async fn converse(
        &self,
        message: &str,
        context: &ContextMap,
        history: &[Message],
        decision: Option<&RoutingDecision>,
    ) -> Result<WorkerReply, AgentError> {
        let target = self.route(message, decision);
        self.invoke_worker(&target, message, context, history).await
    }

    /// Run one turn against a named worker, recording the outcome in the
    /// registry's metrics either way.
    pub async fn invoke_worker(
        &self,
        name: &str,
        message: &str,
        context: &ContextMap,
        history: &[Message],
    ) -> Result<WorkerReply, AgentError> {
        let worker = self
            .registry
            .worker(name)
            .filter(|w| w.is_active() && w.is_initialized())
            .ok_or_else(|| AgentError::WorkerNotFound(name.to_string()))?;

        let started = Instant::now();
        match worker.respond(message, context, history).await {
            Ok(reply) => {
                self.registry
                    .record_interaction(name, true, reply.elapsed_ms, None);
                Ok(reply)
            }
            Err(err) => {
                let elapsed = started.elapsed().as_millis() as u64;
                self.registry.record_interaction(name, false, elapsed, None);
                info!("Worker {} turn failed: {}", name, err);
                Err(err)
            }
        }
    }

    pub async fn execute_tool(
        &self,
        name: &str,
        params: serde_json::Value,
        ctx: &ExecutionContext,
    ) -> ToolExecutionResult {
        self.tools.execute(name, params, ctx).await
    }

    pub async fn execute_handoff(
        &self,
        request: HandoffRequest,
        current_context: ContextMap,
    ) -> HandoffResult {
        self.handoffs.execute_handoff(request, current_context).await
    }

    /// On-demand full system probe.
    pub async fn system_health(&self) -> SystemHealthReport {
        self.health.run_health_check().await
    }

    /// Metrics-derived worker status, optionally narrowed to one worker.
    pub fn worker_health(&self, name: Option<&str>) -> HashMap<String, WorkerStatus> {
        let mut all = self.registry.health();
        if let Some(name) = name {
            all.retain(|key, _| key == name);
        }
        all
    }
}
