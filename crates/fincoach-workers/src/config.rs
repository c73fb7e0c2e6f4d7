use fincoach_core::WorkerRole;
use fincoach_tools::builtin::{CATEGORIZE_TRANSACTION, CHECK_ENVELOPE_BALANCE, SPENDING_SUMMARY};
use serde::{Deserialize, Serialize};

use crate::prompts;

fn default_turn_timeout_ms() -> u64 {
    30_000
}

fn default_active() -> bool {
    true
}

/// Static configuration for one worker, loaded once at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub name: String,
    pub role: WorkerRole,
    pub instructions: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default = "default_turn_timeout_ms")]
    pub turn_timeout_ms: u64,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(default)]
    pub handoff_targets: Vec<String>,
    /// Tie-break weight when several workers share a role; higher wins.
    #[serde(default)]
    pub priority: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

pub const BUDGET_COACH: &str = "budget_coach";
pub const TRANSACTION_ANALYST: &str = "transaction_analyst";
pub const INSIGHT_ADVISOR: &str = "insight_advisor";
pub const FINANCE_GUIDE: &str = "finance_guide";

/// The fixed worker set. Handoff targets reference each other by name and
/// may form cycles; the registry resolves them in a second pass.
pub fn default_workers() -> Vec<WorkerConfig> {
    vec![
        WorkerConfig {
            name: BUDGET_COACH.into(),
            role: WorkerRole::Budgeting,
            instructions: prompts::BUDGET_COACH_PROMPT.into(),
            temperature: 0.3,
            max_tokens: 800,
            turn_timeout_ms: default_turn_timeout_ms(),
            allowed_tools: vec![CHECK_ENVELOPE_BALANCE.into(), SPENDING_SUMMARY.into()],
            handoff_targets: vec![TRANSACTION_ANALYST.into(), FINANCE_GUIDE.into()],
            priority: 10,
            active: true,
        },
        WorkerConfig {
            name: TRANSACTION_ANALYST.into(),
            role: WorkerRole::Analysis,
            instructions: prompts::TRANSACTION_ANALYST_PROMPT.into(),
            temperature: 0.2,
            max_tokens: 800,
            turn_timeout_ms: default_turn_timeout_ms(),
            allowed_tools: vec![CATEGORIZE_TRANSACTION.into(), SPENDING_SUMMARY.into()],
            handoff_targets: vec![BUDGET_COACH.into(), FINANCE_GUIDE.into()],
            priority: 10,
            active: true,
        },
        WorkerConfig {
            name: INSIGHT_ADVISOR.into(),
            role: WorkerRole::Insight,
            instructions: prompts::INSIGHT_ADVISOR_PROMPT.into(),
            temperature: 0.5,
            max_tokens: 1000,
            turn_timeout_ms: default_turn_timeout_ms(),
            allowed_tools: vec![SPENDING_SUMMARY.into()],
            handoff_targets: vec![FINANCE_GUIDE.into()],
            priority: 5,
            active: true,
        },
        WorkerConfig {
            name: FINANCE_GUIDE.into(),
            role: WorkerRole::General,
            instructions: prompts::FINANCE_GUIDE_PROMPT.into(),
            temperature: 0.6,
            max_tokens: 800,
            turn_timeout_ms: default_turn_timeout_ms(),
            allowed_tools: vec![
                CHECK_ENVELOPE_BALANCE.into(),
                CATEGORIZE_TRANSACTION.into(),
                SPENDING_SUMMARY.into(),
            ],
            handoff_targets: vec![
                BUDGET_COACH.into(),
                TRANSACTION_ANALYST.into(),
                INSIGHT_ADVISOR.into(),
            ],
            priority: 1,
            active: true,
        },
    ]
}
