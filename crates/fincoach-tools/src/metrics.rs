use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Best-effort running counters for one tool, keyed by tool name in the
/// registry. Updated after every execution, consumed by the health monitor
/// and diagnostics endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolMetrics {
    pub executions: u64,
    pub failures: u64,
    pub total_duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_executed: Option<DateTime<Utc>>,
}

impl ToolMetrics {
    pub fn record(&mut self, success: bool, duration_ms: u64) {
        self.executions += 1;
        if !success {
            self.failures += 1;
        }
        self.total_duration_ms += duration_ms;
        self.last_executed = Some(Utc::now());
    }

    pub fn successes(&self) -> u64 {
        self.executions - self.failures
    }

    pub fn average_duration_ms(&self) -> f64 {
        if self.executions == 0 {
            0.0
        } else {
            self.total_duration_ms as f64 / self.executions as f64
        }
    }
}
