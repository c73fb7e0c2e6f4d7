use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use fincoach_core::{AgentError, ChatProvider, WorkerRole};
use fincoach_tools::ToolRegistry;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::WorkerConfig;
use crate::metrics::WorkerMetrics;
use crate::worker::Worker;

/// Derived per-worker health fields, a pure projection of current metrics.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub role: WorkerRole,
    pub active: bool,
    pub initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    pub total_interactions: u64,
    pub success_rate: f64,
    pub average_response_time_ms: f64,
    pub average_confidence: f64,
    pub error_count: u64,
    pub handoff_count: u64,
}

/// Holds every configured worker and its metrics.
///
/// Initialization is two-phase: all workers are constructed by name first,
/// then handoff targets are resolved against the completed table. The
/// target graph may be cyclic, so eager resolution during construction
/// would dereference workers that do not exist yet.
pub struct WorkerRegistry {
    workers: DashMap<String, Arc<Worker>>,
    metrics: DashMap<String, WorkerMetrics>,
    initialized: AtomicBool,
}

impl std::fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field(
                "workers",
                &self.workers.iter().map(|e| e.key().clone()).collect::<Vec<_>>(),
            )
            .field("metrics", &self.metrics)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl WorkerRegistry {
    /// Build the registry from static configuration. Any construction or
    /// wiring failure is fatal: a misconfigured worker set blocks startup.
    pub fn initialize(
        configs: Vec<WorkerConfig>,
        provider: Arc<dyn ChatProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Result<Self, AgentError> {
        let registry = Self {
            workers: DashMap::new(),
            metrics: DashMap::new(),
            initialized: AtomicBool::new(false),
        };

        // Phase 1: construct every worker entry by name.
        for config in configs {
            let name = config.name.clone();
            if registry.workers.contains_key(&name) {
                return Err(AgentError::Config(format!("duplicate worker name: {name}")));
            }
            let worker = Worker::new(config, provider.clone(), tools.clone())?;
            registry.workers.insert(name.clone(), Arc::new(worker));
            registry.metrics.insert(name, WorkerMetrics::default());
        }

        // Phase 2: wire handoff targets now that every name resolves.
        for entry in registry.workers.iter() {
            let declared: Vec<String> = entry.value().declared_targets().to_vec();
            for target in &declared {
                if !registry.workers.contains_key(target) {
                    return Err(AgentError::Config(format!(
                        "worker {} declares unknown handoff target {}",
                        entry.key(),
                        target
                    )));
                }
            }
            entry.value().wire_targets(declared);
        }

        for role in WorkerRole::all() {
            if !registry.workers.iter().any(|e| e.value().role() == role) {
                return Err(AgentError::Config(format!(
                    "no worker configured for required role {role:?}"
                )));
            }
        }

        info!("Worker registry initialized with {} workers", registry.workers.len());
        registry.initialized.store(true, Ordering::Release);
        Ok(registry)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn worker(&self, name: &str) -> Option<Arc<Worker>> {
        self.workers.get(name).map(|w| w.clone())
    }

    pub fn all_workers(&self) -> Vec<Arc<Worker>> {
        self.workers.iter().map(|e| e.value().clone()).collect()
    }

    pub fn active_workers(&self) -> Vec<Arc<Worker>> {
        self.workers
            .iter()
            .filter(|e| e.value().is_active() && e.value().is_initialized())
            .map(|e| e.value().clone())
            .collect()
    }

    pub fn set_active(&self, name: &str, active: bool) -> Result<(), AgentError> {
        let worker = self
            .workers
            .get(name)
            .ok_or_else(|| AgentError::WorkerNotFound(name.to_string()))?;
        worker.set_active(active);
        info!("Worker {} set {}", name, if active { "active" } else { "inactive" });
        Ok(())
    }

    /// Update a worker's metrics after one invocation. Best-effort: an
    /// unknown name is logged and skipped rather than failing the caller.
    pub fn record_interaction(
        &self,
        name: &str,
        success: bool,
        response_time_ms: u64,
        confidence: Option<f64>,
    ) {
        match self.metrics.get_mut(name) {
            Some(mut metrics) => metrics.record_interaction(success, response_time_ms, confidence),
            None => warn!("record_interaction for unknown worker {}", name),
        }
    }

    /// Count a completed handoff against the source worker.
    pub fn record_handoff(&self, from_worker: &str, to_worker: &str) {
        match self.metrics.get_mut(from_worker) {
            Some(mut metrics) => {
                metrics.record_handoff();
                info!("Handoff recorded: {} -> {}", from_worker, to_worker);
            }
            None => warn!("record_handoff for unknown worker {}", from_worker),
        }
    }

    pub fn worker_metrics(&self, name: &str) -> Option<WorkerMetrics> {
        self.metrics.get(name).map(|m| m.clone())
    }

    /// Administrative reset of one worker's accumulated metrics.
    pub fn reset_metrics(&self, name: &str) -> Result<(), AgentError> {
        let mut metrics = self
            .metrics
            .get_mut(name)
            .ok_or_else(|| AgentError::WorkerNotFound(name.to_string()))?;
        *metrics = WorkerMetrics::default();
        Ok(())
    }

    /// Worker name -> derived health fields. No side effects.
    pub fn health(&self) -> HashMap<String, WorkerStatus> {
        self.workers
            .iter()
            .map(|entry| {
                let worker = entry.value();
                let metrics = self
                    .metrics
                    .get(entry.key())
                    .map(|m| m.clone())
                    .unwrap_or_default();
                (
                    entry.key().clone(),
                    WorkerStatus {
                        role: worker.role(),
                        active: worker.is_active(),
                        initialized: worker.is_initialized(),
                        last_used: metrics.last_used,
                        total_interactions: metrics.total_interactions,
                        success_rate: metrics.success_rate(),
                        average_response_time_ms: metrics.average_response_time_ms,
                        average_confidence: metrics.average_confidence,
                        error_count: metrics.error_count,
                        handoff_count: metrics.handoff_count,
                    },
                )
            })
            .collect()
    }

    /// Log final metrics and clear the registry.
    pub fn shutdown(&self) {
        for entry in self.metrics.iter() {
            let m = entry.value();
            info!(
                "Worker {} final metrics: {} interactions, {:.1}% success, {} handoffs",
                entry.key(),
                m.total_interactions,
                m.success_rate(),
                m.handoff_count
            );
        }
        self.workers.clear();
        self.metrics.clear();
        self.initialized.store(false, Ordering::Release);
    }
}
