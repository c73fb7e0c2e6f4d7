//! Worker registry: the configured set of conversational coaching workers,
//! their metrics, and two-phase initialization that defers handoff-target
//! wiring until every worker exists.

pub mod config;
pub mod metrics;
pub mod prompts;
pub mod registry;
pub mod worker;

pub use config::{default_workers, WorkerConfig};
pub use metrics::WorkerMetrics;
pub use registry::{WorkerRegistry, WorkerStatus};
pub use worker::{Worker, WorkerReply};
