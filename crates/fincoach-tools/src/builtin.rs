//! Built-in finance tools registered at startup.
//!
//! Each tool reads through the opaque [`PersistenceStore`] and, for
//! categorization, delegates to the [`CategorizationHeuristics`]
//! collaborator. None of them owns business logic beyond shaping the
//! collaborator's answer for the invoking worker.

use std::sync::Arc;

use async_trait::async_trait;
use fincoach_core::{AgentError, CategorizationHeuristics, PersistenceStore};
use serde_json::{json, Value};

use crate::definition::{ExecutionContext, RiskLevel, ToolCategory, ToolDefinition, ToolExecutor};
use crate::registry::ToolRegistry;

pub const CHECK_ENVELOPE_BALANCE: &str = "check_envelope_balance";
pub const CATEGORIZE_TRANSACTION: &str = "categorize_transaction";
pub const SPENDING_SUMMARY: &str = "spending_summary";

fn envelopes_key(user_id: &str) -> String {
    format!("envelopes:{user_id}")
}

fn transactions_key(user_id: &str) -> String {
    format!("transactions:{user_id}")
}

/// Looks up one envelope's balance for the calling user.
pub struct CheckEnvelopeBalance {
    store: Arc<dyn PersistenceStore>,
}

#[async_trait]
impl ToolExecutor for CheckEnvelopeBalance {
    async fn run(&self, params: Value, ctx: &ExecutionContext) -> Result<Value, AgentError> {
        let envelope = params
            .get("envelope")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::Validation("missing envelope name".into()))?;

        let envelopes = self
            .store
            .get(&envelopes_key(&ctx.user_id))
            .await?
            .unwrap_or_else(|| json!([]));

        let found = envelopes
            .as_array()
            .into_iter()
            .flatten()
            .find(|e| e.get("name").and_then(|n| n.as_str()) == Some(envelope));

        match found {
            Some(entry) => Ok(json!({
                "envelope": envelope,
                "balance": entry.get("balance").cloned().unwrap_or(json!(0)),
                "budgeted": entry.get("budgeted").cloned().unwrap_or(json!(0)),
            })),
            None => Err(AgentError::Execution(format!(
                "No envelope named '{envelope}' for user {}",
                ctx.user_id
            ))),
        }
    }
}

/// Suggests envelopes for a transaction via the categorization heuristics.
pub struct CategorizeTransaction {
    store: Arc<dyn PersistenceStore>,
    heuristics: Arc<dyn CategorizationHeuristics>,
}

#[async_trait]
impl ToolExecutor for CategorizeTransaction {
    async fn run(&self, params: Value, ctx: &ExecutionContext) -> Result<Value, AgentError> {
        let transaction = params
            .get("transaction")
            .cloned()
            .ok_or_else(|| AgentError::Validation("missing transaction".into()))?;

        let envelopes: Vec<String> = self
            .store
            .get(&envelopes_key(&ctx.user_id))
            .await?
            .and_then(|v| {
                v.as_array().map(|arr| {
                    arr.iter()
                        .filter_map(|e| e.get("name").and_then(|n| n.as_str()))
                        .map(str::to_string)
                        .collect()
                })
            })
            .unwrap_or_default();

        let suggestions = self.heuristics.suggest(&transaction, &envelopes).await?;
        Ok(json!({ "suggestions": suggestions }))
    }
}

/// Totals the user's recent transactions by envelope.
pub struct SpendingSummary {
    store: Arc<dyn PersistenceStore>,
}

#[async_trait]
impl ToolExecutor for SpendingSummary {
    async fn run(&self, params: Value, ctx: &ExecutionContext) -> Result<Value, AgentError> {
        let period = params
            .get("period")
            .and_then(|v| v.as_str())
            .unwrap_or("month");

        let transactions = self
            .store
            .get(&transactions_key(&ctx.user_id))
            .await?
            .unwrap_or_else(|| json!([]));

        let mut totals: serde_json::Map<String, Value> = serde_json::Map::new();
        let mut count = 0u64;
        for tx in transactions.as_array().into_iter().flatten() {
            let envelope = tx
                .get("envelope")
                .and_then(|e| e.as_str())
                .unwrap_or("uncategorized");
            let amount = tx.get("amount").and_then(|a| a.as_f64()).unwrap_or(0.0);
            let entry = totals
                .entry(envelope.to_string())
                .or_insert(json!(0.0));
            *entry = json!(entry.as_f64().unwrap_or(0.0) + amount);
            count += 1;
        }

        Ok(json!({
            "period": period,
            "transactions": count,
            "by_envelope": totals,
        }))
    }
}

/// Register the built-in tool set. Called once from the composition root;
/// any failure here is a startup-blocking configuration error.
pub fn register_builtin_tools(
    registry: &ToolRegistry,
    store: Arc<dyn PersistenceStore>,
    heuristics: Arc<dyn CategorizationHeuristics>,
) -> Result<(), AgentError> {
    registry.register(ToolDefinition {
        name: CHECK_ENVELOPE_BALANCE.into(),
        description: "Look up the current balance of one budget envelope".into(),
        category: ToolCategory::Budgeting,
        parameter_schema: json!({
            "type": "object",
            "properties": {
                "envelope": { "type": "string", "minLength": 1 }
            },
            "required": ["envelope"]
        }),
        requires_auth: false,
        risk_level: RiskLevel::Low,
        estimated_duration_ms: 50,
        executor: Arc::new(CheckEnvelopeBalance {
            store: store.clone(),
        }),
    })?;

    registry.register(ToolDefinition {
        name: CATEGORIZE_TRANSACTION.into(),
        description: "Suggest envelopes for a transaction using the categorization heuristics"
            .into(),
        category: ToolCategory::Transactions,
        parameter_schema: json!({
            "type": "object",
            "properties": {
                "transaction": { "type": "object" }
            },
            "required": ["transaction"]
        }),
        requires_auth: false,
        risk_level: RiskLevel::Low,
        estimated_duration_ms: 150,
        executor: Arc::new(CategorizeTransaction { store: store.clone(), heuristics }),
    })?;

    registry.register(ToolDefinition {
        name: SPENDING_SUMMARY.into(),
        description: "Total recent spending by envelope for the calling user".into(),
        category: ToolCategory::Insights,
        parameter_schema: json!({
            "type": "object",
            "properties": {
                "period": { "type": "string", "enum": ["week", "month"] }
            }
        }),
        requires_auth: false,
        risk_level: RiskLevel::Low,
        estimated_duration_ms: 100,
        executor: Arc::new(SpendingSummary { store }),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use dashmap::DashMap;
    use fincoach_core::CategorySuggestion;

    use super::*;

    struct FakeStore {
        records: DashMap<String, Value>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                records: DashMap::new(),
            }
        }
    }

    #[async_trait]
    impl PersistenceStore for FakeStore {
        async fn get(&self, key: &str) -> Result<Option<Value>, AgentError> {
            Ok(self.records.get(key).map(|v| v.clone()))
        }

        async fn put(&self, key: &str, value: Value) -> Result<(), AgentError> {
            self.records.insert(key.to_string(), value);
            Ok(())
        }

        async fn ping(&self) -> Result<(), AgentError> {
            Ok(())
        }
    }

    struct FakeHeuristics;

    #[async_trait]
    impl CategorizationHeuristics for FakeHeuristics {
        async fn suggest(
            &self,
            _transaction: &Value,
            envelopes: &[String],
        ) -> Result<Vec<CategorySuggestion>, AgentError> {
            Ok(envelopes
                .first()
                .map(|name| CategorySuggestion {
                    envelope: name.clone(),
                    confidence: 0.9,
                    source: "keyword".into(),
                })
                .into_iter()
                .collect())
        }
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext {
            user_id: "u1".into(),
            session_id: "s1".into(),
            authenticated: true,
            timeout_ms: None,
        }
    }

    async fn seeded_registry() -> ToolRegistry {
        let store = Arc::new(FakeStore::new());
        store
            .put(
                "envelopes:u1",
                json!([
                    { "name": "groceries", "balance": 120.0, "budgeted": 400.0 },
                    { "name": "rent", "balance": 0.0, "budgeted": 1200.0 }
                ]),
            )
            .await
            .unwrap();
        store
            .put(
                "transactions:u1",
                json!([
                    { "envelope": "groceries", "amount": 42.0 },
                    { "envelope": "groceries", "amount": 18.0 },
                    { "amount": 7.5 }
                ]),
            )
            .await
            .unwrap();

        let registry = ToolRegistry::new();
        register_builtin_tools(&registry, store, Arc::new(FakeHeuristics)).unwrap();
        registry
    }

    #[tokio::test]
    async fn registers_the_full_builtin_set() {
        let registry = seeded_registry().await;
        assert_eq!(registry.tool_count(), 3);
        assert!(registry.contains(CHECK_ENVELOPE_BALANCE));
        assert!(registry.contains(CATEGORIZE_TRANSACTION));
        assert!(registry.contains(SPENDING_SUMMARY));
    }

    #[tokio::test]
    async fn balance_lookup_finds_the_envelope() {
        let registry = seeded_registry().await;
        let result = registry
            .execute(
                CHECK_ENVELOPE_BALANCE,
                json!({ "envelope": "groceries" }),
                &ctx(),
            )
            .await;

        assert!(result.success);
        let payload = result.result.unwrap();
        assert_eq!(payload["balance"], json!(120.0));
    }

    #[tokio::test]
    async fn balance_lookup_fails_softly_for_unknown_envelope() {
        let registry = seeded_registry().await;
        let result = registry
            .execute(
                CHECK_ENVELOPE_BALANCE,
                json!({ "envelope": "vacation" }),
                &ctx(),
            )
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("vacation"));
    }

    #[tokio::test]
    async fn categorization_uses_the_heuristics_collaborator() {
        let registry = seeded_registry().await;
        let result = registry
            .execute(
                CATEGORIZE_TRANSACTION,
                json!({ "transaction": { "merchant": "Safeway", "amount": 31.0 } }),
                &ctx(),
            )
            .await;

        assert!(result.success);
        let suggestions = result.result.unwrap();
        assert_eq!(suggestions["suggestions"][0]["envelope"], json!("groceries"));
    }

    #[tokio::test]
    async fn summary_totals_by_envelope() {
        let registry = seeded_registry().await;
        let result = registry
            .execute(SPENDING_SUMMARY, json!({ "period": "week" }), &ctx())
            .await;

        assert!(result.success);
        let payload = result.result.unwrap();
        assert_eq!(payload["transactions"], json!(3));
        assert_eq!(payload["by_envelope"]["groceries"], json!(60.0));
        assert_eq!(payload["by_envelope"]["uncategorized"], json!(7.5));
    }

    #[tokio::test]
    async fn summary_rejects_unknown_period_via_schema() {
        let registry = seeded_registry().await;
        let result = registry
            .execute(SPENDING_SUMMARY, json!({ "period": "decade" }), &ctx())
            .await;
        assert!(!result.success);
    }
}
