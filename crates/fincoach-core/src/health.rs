use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Rolling per-worker probe state, recomputed on each health-check tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerHealthSnapshot {
    pub is_online: bool,
    pub last_response_time_ms: u64,
    /// 0–100, `(total_requests - error_count) / total_requests * 100`;
    /// 100 when no samples have been taken.
    pub success_rate: f64,
    pub total_requests: u64,
    pub error_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub last_health_check: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolProbeReport {
    pub probed: usize,
    pub available: usize,
    pub failed: usize,
    /// failed / probed, in 0.0–1.0. Zero when nothing was probed.
    pub error_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    pub name: String,
    pub reachable: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealthReport {
    pub overall: HealthLevel,
    pub agent_tier: HealthLevel,
    pub workers: HashMap<String, WorkerHealthSnapshot>,
    pub tools: ToolProbeReport,
    pub dependencies: Vec<DependencyReport>,
    pub checked_at: DateTime<Utc>,
}
