use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use fincoach_core::{
    ChatProvider, ContextMap, DependencyReport, ErrorKind, HealthLevel, PersistenceStore,
    SystemHealthReport, ToolProbeReport, WorkerHealthSnapshot,
};
use fincoach_tools::{ExecutionContext, ToolRegistry};
use fincoach_workers::WorkerRegistry;
use tracing::{info, warn};

const PROBE_MESSAGE: &str = "health check ping";

#[derive(Debug, Clone)]
pub struct HealthMonitorConfig {
    pub probe_timeout_ms: u64,
    pub interval: Duration,
    /// Fixed sample of read-only tools probed with synthetic payloads.
    /// Mutating tools stay out of this list.
    pub critical_tools: Vec<(String, serde_json::Value)>,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 5_000,
            interval: Duration::from_secs(300),
            critical_tools: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct ProbeMetrics {
    total_requests: u64,
    error_count: u64,
    last_response_time_ms: u64,
    last_error: Option<String>,
    last_check: DateTime<Utc>,
    online: bool,
}

impl Default for ProbeMetrics {
    fn default() -> Self {
        // Clean baseline: 100% success with zero samples.
        Self {
            total_requests: 0,
            error_count: 0,
            last_response_time_ms: 0,
            last_error: None,
            last_check: Utc::now(),
            online: true,
        }
    }
}

impl ProbeMetrics {
    fn record(&mut self, success: bool, response_time_ms: u64, error: Option<String>) {
        self.total_requests += 1;
        if !success {
            self.error_count += 1;
            self.last_error = error;
        }
        self.last_response_time_ms = response_time_ms;
        self.last_check = Utc::now();
        self.online = success;
    }

    fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            100.0
        } else {
            (self.total_requests - self.error_count) as f64 / self.total_requests as f64 * 100.0
        }
    }

    fn snapshot(&self) -> WorkerHealthSnapshot {
        WorkerHealthSnapshot {
            is_online: self.online,
            last_response_time_ms: self.last_response_time_ms,
            success_rate: self.success_rate(),
            total_requests: self.total_requests,
            error_count: self.error_count,
            last_error: self.last_error.clone(),
            last_health_check: self.last_check,
        }
    }
}

/// Periodic health probe over workers, a critical-tool sample, and the two
/// hard external dependencies.
///
/// Read-only with respect to the registries; it only invokes workers and
/// tools as synthetic probes. Probe state lives in memory and starts from
/// a clean baseline on every process start. A failing probe is data, not a
/// fatal condition: the check itself never errors.
pub struct HealthMonitor {
    registry: Arc<WorkerRegistry>,
    tools: Arc<ToolRegistry>,
    chat: Arc<dyn ChatProvider>,
    store: Arc<dyn PersistenceStore>,
    probes: DashMap<String, ProbeMetrics>,
    config: HealthMonitorConfig,
}

impl HealthMonitor {
    pub fn new(
        registry: Arc<WorkerRegistry>,
        tools: Arc<ToolRegistry>,
        chat: Arc<dyn ChatProvider>,
        store: Arc<dyn PersistenceStore>,
        config: HealthMonitorConfig,
    ) -> Self {
        Self {
            registry,
            tools,
            chat,
            store,
            probes: DashMap::new(),
            config,
        }
    }

    /// Run the check forever on the configured interval. The first tick
    /// fires immediately, establishing the baseline report.
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.config.interval);
            loop {
                ticker.tick().await;
                let report = monitor.run_health_check().await;
                info!("Health check: overall {:?}", report.overall);
            }
        })
    }

    pub async fn run_health_check(&self) -> SystemHealthReport {
        let probe_timeout = Duration::from_millis(self.config.probe_timeout_ms);

        // 1. Synthetic probe per worker. The probe await happens outside
        //    any map guard; only the metric update touches the map.
        for worker in self.registry.all_workers() {
            let started = Instant::now();
            let outcome = tokio::time::timeout(
                probe_timeout,
                worker.respond(PROBE_MESSAGE, &ContextMap::new(), &[]),
            )
            .await;
            let elapsed = started.elapsed().as_millis() as u64;

            let (success, error) = match outcome {
                Ok(Ok(_)) => (true, None),
                Ok(Err(err)) => (false, Some(err.to_string())),
                Err(_) => (
                    false,
                    Some(format!("probe timeout after {}ms", self.config.probe_timeout_ms)),
                ),
            };
            if let Some(ref err) = error {
                warn!("Worker probe failed for {}: {}", worker.name(), err);
            }
            self.probes
                .entry(worker.name().to_string())
                .or_default()
                .record(success, elapsed, error);
        }

        let workers: std::collections::HashMap<String, WorkerHealthSnapshot> = self
            .probes
            .iter()
            .map(|e| (e.key().clone(), e.value().snapshot()))
            .collect();

        // 2. Agent-tier classification.
        let agent_tier = classify_agent_tier(&workers);

        // 3. Critical-tool sample.
        let tools = self.probe_tools().await;

        // 4. Hard external dependencies.
        let chat_dep = self.probe_dependency("chat_provider", probe_timeout).await;
        let store_dep = self.probe_dependency("persistence", probe_timeout).await;

        // 5. Strict precedence for the overall status.
        let overall = if !store_dep.reachable {
            HealthLevel::Unhealthy
        } else if !chat_dep.reachable {
            HealthLevel::Degraded
        } else if tools.error_rate > 0.5 {
            HealthLevel::Degraded
        } else {
            agent_tier
        };

        SystemHealthReport {
            overall,
            agent_tier,
            workers,
            tools,
            dependencies: vec![chat_dep, store_dep],
            checked_at: Utc::now(),
        }
    }

    async fn probe_tools(&self) -> ToolProbeReport {
        let mut probed = 0usize;
        let mut available = 0usize;
        let mut failed = 0usize;

        let ctx = ExecutionContext {
            user_id: "health_probe".into(),
            session_id: "health".into(),
            authenticated: true,
            timeout_ms: Some(self.config.probe_timeout_ms),
        };

        for (name, payload) in &self.config.critical_tools {
            probed += 1;
            let result = self.tools.execute(name, payload.clone(), &ctx).await;
            if result.error_kind != Some(ErrorKind::NotFound) {
                available += 1;
            }
            if !result.success {
                failed += 1;
                warn!(
                    "Tool probe failed for {}: {}",
                    name,
                    result.error.unwrap_or_default()
                );
            }
        }

        let error_rate = if probed == 0 {
            0.0
        } else {
            failed as f64 / probed as f64
        };

        ToolProbeReport {
            probed,
            available,
            failed,
            error_rate,
        }
    }

    async fn probe_dependency(&self, name: &str, timeout: Duration) -> DependencyReport {
        let started = Instant::now();
        let outcome = match name {
            "chat_provider" => tokio::time::timeout(timeout, self.chat.ping()).await,
            _ => tokio::time::timeout(timeout, self.store.ping()).await,
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        let error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(_) => Some(format!("ping timeout after {}ms", timeout.as_millis())),
        };
        if let Some(ref err) = error {
            warn!("Dependency probe failed for {}: {}", name, err);
        }

        DependencyReport {
            name: name.to_string(),
            reachable: error.is_none(),
            latency_ms,
            error,
        }
    }
}

/// healthy when at least 80% of workers sit at >= 80% probe success,
/// degraded at 50%, unhealthy below. An empty registry is unhealthy.
fn classify_agent_tier(
    workers: &std::collections::HashMap<String, WorkerHealthSnapshot>,
) -> HealthLevel {
    if workers.is_empty() {
        return HealthLevel::Unhealthy;
    }

    let healthy = workers
        .values()
        .filter(|w| w.success_rate >= 80.0)
        .count() as f64;
    let ratio = healthy / workers.len() as f64;

    if ratio >= 0.8 {
        HealthLevel::Healthy
    } else if ratio >= 0.5 {
        HealthLevel::Degraded
    } else {
        HealthLevel::Unhealthy
    }
}
