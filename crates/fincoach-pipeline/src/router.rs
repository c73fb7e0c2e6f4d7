use std::sync::Arc;

use fincoach_core::WorkerRole;
use fincoach_workers::WorkerRegistry;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A pre-computed routing decision from an external reasoning step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub target_worker: String,
    pub reason: String,
    pub confidence: f64,
}

/// Delegated decisions below this confidence fall back to keywords.
pub const MIN_DELEGATED_CONFIDENCE: f64 = 0.5;

const BUDGET_KEYWORDS: &[&str] = &[
    "budget", "envelope", "allocat", "rebalance", "fund", "save for", "set aside",
];
const TRANSACTION_KEYWORDS: &[&str] = &[
    "transaction", "spent", "spending", "charge", "purchase", "categor", "merchant", "bought",
];
const INSIGHT_KEYWORDS: &[&str] = &[
    "insight", "trend", "pattern", "compare", "over time", "month over month", "habit",
];

/// Picks a target worker for a message. Stateless beyond the registry
/// reference, and never fails: a malformed or low-confidence delegated
/// decision silently falls back to the keyword strategy.
pub struct Router {
    registry: Arc<WorkerRegistry>,
}

impl Router {
    pub fn new(registry: Arc<WorkerRegistry>) -> Self {
        Self { registry }
    }

    pub fn route(&self, message: &str, decision: Option<&RoutingDecision>) -> String {
        if let Some(decision) = decision {
            if decision.confidence > MIN_DELEGATED_CONFIDENCE {
                if let Some(worker) = self.registry.worker(&decision.target_worker) {
                    if worker.is_active() && worker.is_initialized() {
                        debug!(
                            "Router: delegated decision -> {} ({:.2}: {})",
                            decision.target_worker, decision.confidence, decision.reason
                        );
                        return decision.target_worker.clone();
                    }
                }
            }
            debug!("Router: delegated decision rejected, falling back to keywords");
        }

        self.keyword_route(message)
    }

    /// Fixed category priority: budgeting, then analysis, then insight;
    /// everything else lands on the generalist.
    fn keyword_route(&self, message: &str) -> String {
        let lower = message.to_lowercase();

        let role = if contains_any(&lower, BUDGET_KEYWORDS) {
            WorkerRole::Budgeting
        } else if contains_any(&lower, TRANSACTION_KEYWORDS) {
            WorkerRole::Analysis
        } else if contains_any(&lower, INSIGHT_KEYWORDS) {
            WorkerRole::Insight
        } else {
            WorkerRole::General
        };

        debug!("Router: keyword route -> {:?}", role);
        self.worker_for_role(role)
    }

    fn worker_for_role(&self, role: WorkerRole) -> String {
        let pick = |candidates: &[Arc<fincoach_workers::Worker>], role: WorkerRole| {
            candidates
                .iter()
                .filter(|w| w.role() == role)
                .max_by(|a, b| {
                    a.priority()
                        .cmp(&b.priority())
                        .then_with(|| b.name().cmp(a.name()))
                })
                .map(|w| w.name().to_string())
        };

        let active = self.registry.active_workers();
        pick(&active, role)
            .or_else(|| pick(&active, WorkerRole::General))
            .or_else(|| {
                // Nothing active at all; name a configured worker anyway so
                // the caller gets a deterministic "not active" failure.
                pick(&self.registry.all_workers(), role)
            })
            .unwrap_or_default()
    }
}

fn contains_any(message: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| message.contains(k))
}
