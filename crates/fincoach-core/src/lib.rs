//! Core domain types, error definitions, and collaborator traits.
//!
//! This crate defines the fundamental types shared across the coaching
//! agent system: errors, conversation messages, handoff contracts, health
//! reports, and the traits for external collaborators (chat completion,
//! persistence, transaction categorization).

pub mod error;
pub mod handoff;
pub mod health;
pub mod provider;
pub mod types;

pub use error::{AgentError, ErrorKind};
pub use handoff::{HandoffPriority, HandoffRequest, HandoffResult};
pub use health::{
    DependencyReport, HealthLevel, SystemHealthReport, ToolProbeReport, WorkerHealthSnapshot,
};
pub use provider::{
    CategorizationHeuristics, CategorySuggestion, ChatOptions, ChatProvider, PersistenceStore,
};
pub use types::*;
