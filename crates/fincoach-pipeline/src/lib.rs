//! Orchestration pipeline: message routing, worker handoffs, system health
//! monitoring, and the facade the HTTP layer calls into.

pub mod handoff;
pub mod health;
pub mod orchestrator;
pub mod router;

pub use handoff::{HandoffManager, ESCALATION_CEILING};
pub use health::{HealthMonitor, HealthMonitorConfig};
pub use orchestrator::Orchestrator;
pub use router::{Router, RoutingDecision};
