use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use fincoach_core::AgentError;
use jsonschema::Validator;
use tracing::{debug, warn};

use crate::definition::{ExecutionContext, ToolDefinition, ToolExecutionResult, ToolSpec};
use crate::metrics::ToolMetrics;
use crate::validation;

struct RegisteredTool {
    definition: Arc<ToolDefinition>,
    validator: Arc<Validator>,
}

/// Registry of executable tools.
///
/// Registration is fail-fast: a bad name or schema is a configuration
/// error at startup. Execution is fail-soft: every failure mode comes
/// back as a `ToolExecutionResult` with `success == false`.
#[derive(Default)]
pub struct ToolRegistry {
    tools: DashMap<String, RegisteredTool>,
    metrics: DashMap<String, ToolMetrics>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a tool by name. Overwriting with an identical
    /// definition is a no-op as far as the tool count is concerned;
    /// accumulated metrics for the name are kept.
    pub fn register(&self, definition: ToolDefinition) -> Result<(), AgentError> {
        if definition.name.trim().is_empty() {
            return Err(AgentError::Config("tool name must not be empty".into()));
        }

        let validator = validation::compile_schema(&definition.parameter_schema)?;

        debug!("Registering tool: {}", definition.name);
        self.tools.insert(
            definition.name.clone(),
            RegisteredTool {
                definition: Arc::new(definition),
                validator: Arc::new(validator),
            },
        );
        Ok(())
    }

    /// Execute a tool by name. Never returns an `Err`; lookup failures,
    /// validation failures, timeouts, and executor errors all surface in
    /// the result's failure branch.
    pub async fn execute(
        &self,
        name: &str,
        params: serde_json::Value,
        ctx: &ExecutionContext,
    ) -> ToolExecutionResult {
        // Clone the Arcs and drop the map guard before any await so a slow
        // executor cannot hold the shard lock.
        let (definition, validator) = match self.tools.get(name) {
            Some(entry) => (entry.definition.clone(), entry.validator.clone()),
            None => {
                return ToolExecutionResult::err(&AgentError::ToolNotFound(name.to_string()), 0);
            }
        };

        if definition.requires_auth && !ctx.authenticated {
            let err = AgentError::Validation(format!(
                "Tool {name} requires an authenticated context"
            ));
            self.record(name, false, 0);
            return ToolExecutionResult::err(&err, 0);
        }

        if let Err(err) = validation::validate_params(&validator, &params) {
            self.record(name, false, 0);
            return ToolExecutionResult::err(&err, 0);
        }

        let started = Instant::now();
        let outcome = match ctx.timeout_ms {
            Some(ms) => {
                match tokio::time::timeout(
                    Duration::from_millis(ms),
                    definition.executor.run(params, ctx),
                )
                .await
                {
                    Ok(result) => result,
                    // The in-flight executor is abandoned; we only stop
                    // waiting, cancellation does not propagate into it.
                    Err(_) => Err(AgentError::Timeout(ms)),
                }
            }
            None => definition.executor.run(params, ctx).await,
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(value) => {
                self.record(name, true, duration_ms);
                ToolExecutionResult::ok(value, duration_ms)
            }
            Err(err) => {
                warn!("Tool {} failed: {}", name, err);
                self.record(name, false, duration_ms);
                ToolExecutionResult::err(&err, duration_ms)
            }
        }
    }

    fn record(&self, name: &str, success: bool, duration_ms: u64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .record(success, duration_ms);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn all_tools(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .iter()
            .map(|entry| ToolSpec::from(entry.value().definition.as_ref()))
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn metrics(&self) -> HashMap<String, ToolMetrics> {
        self.metrics
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn tool_metrics(&self, name: &str) -> Option<ToolMetrics> {
        self.metrics.get(name).map(|m| m.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use async_trait::async_trait;
    use fincoach_core::ErrorKind;
    use serde_json::json;

    use super::*;
    use crate::definition::{RiskLevel, ToolCategory, ToolExecutor};

    struct Echo;

    #[async_trait]
    impl ToolExecutor for Echo {
        async fn run(
            &self,
            params: serde_json::Value,
            _ctx: &ExecutionContext,
        ) -> Result<serde_json::Value, AgentError> {
            Ok(params)
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl ToolExecutor for AlwaysFails {
        async fn run(
            &self,
            _params: serde_json::Value,
            _ctx: &ExecutionContext,
        ) -> Result<serde_json::Value, AgentError> {
            Err(AgentError::Execution("boom".into()))
        }
    }

    struct Sleeper {
        ms: u64,
        invocations: Arc<AtomicU64>,
    }

    #[async_trait]
    impl ToolExecutor for Sleeper {
        async fn run(
            &self,
            _params: serde_json::Value,
            _ctx: &ExecutionContext,
        ) -> Result<serde_json::Value, AgentError> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(self.ms)).await;
            Ok(json!({ "slept_ms": self.ms }))
        }
    }

    struct Counting {
        invocations: Arc<AtomicU64>,
    }

    #[async_trait]
    impl ToolExecutor for Counting {
        async fn run(
            &self,
            _params: serde_json::Value,
            _ctx: &ExecutionContext,
        ) -> Result<serde_json::Value, AgentError> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok(json!({}))
        }
    }

    fn any_schema() -> serde_json::Value {
        json!({ "type": "object" })
    }

    fn definition(name: &str, executor: Arc<dyn ToolExecutor>) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: format!("{name} test tool"),
            category: ToolCategory::General,
            parameter_schema: any_schema(),
            requires_auth: false,
            risk_level: RiskLevel::Low,
            estimated_duration_ms: 50,
            executor,
        }
    }

    #[tokio::test]
    async fn unknown_tool_returns_not_found_never_panics() {
        let registry = ToolRegistry::new();
        let result = registry
            .execute("nope", json!({}), &ExecutionContext::default())
            .await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::NotFound));
        assert!(result.error.unwrap().contains("Tool not found: nope"));
    }

    #[tokio::test]
    async fn validation_failure_never_invokes_executor() {
        let registry = ToolRegistry::new();
        let invocations = Arc::new(AtomicU64::new(0));
        let mut def = definition(
            "strict",
            Arc::new(Counting {
                invocations: invocations.clone(),
            }),
        );
        def.parameter_schema = json!({
            "type": "object",
            "properties": { "envelope": { "type": "string" } },
            "required": ["envelope"]
        });
        registry.register(def).unwrap();

        let result = registry
            .execute("strict", json!({}), &ExecutionContext::default())
            .await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Validation));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn slow_executor_times_out_within_deadline() {
        let registry = ToolRegistry::new();
        let invocations = Arc::new(AtomicU64::new(0));
        registry
            .register(definition(
                "slow",
                Arc::new(Sleeper {
                    ms: 10_000,
                    invocations: invocations.clone(),
                }),
            ))
            .unwrap();

        let ctx = ExecutionContext {
            timeout_ms: Some(100),
            ..Default::default()
        };

        let started = Instant::now();
        let result = registry.execute("slow", json!({}), &ctx).await;
        let elapsed = started.elapsed();

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Timeout));
        assert!(result.error.unwrap().contains("timeout"));
        assert!(elapsed < Duration::from_millis(500), "waited {elapsed:?}");
        // The executor started but we stopped waiting for it.
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn metrics_reflect_success_and_failure_per_tool() {
        let registry = ToolRegistry::new();
        registry.register(definition("a", Arc::new(Echo))).unwrap();
        registry
            .register(definition("b", Arc::new(AlwaysFails)))
            .unwrap();
        assert_eq!(registry.tool_count(), 2);

        let ctx = ExecutionContext::default();
        let ok = registry.execute("a", json!({}), &ctx).await;
        assert!(ok.success);

        let failed = registry.execute("b", json!({}), &ctx).await;
        assert!(!failed.success);

        let metrics = registry.metrics();
        assert_eq!(metrics["a"].successes(), 1);
        assert_eq!(metrics["a"].failures, 0);
        assert_eq!(metrics["b"].failures, 1);
    }

    #[tokio::test]
    async fn reregistration_is_idempotent_for_tool_count() {
        let registry = ToolRegistry::new();
        registry
            .register(definition("echo", Arc::new(Echo)))
            .unwrap();
        registry
            .register(definition("echo", Arc::new(Echo)))
            .unwrap();
        assert_eq!(registry.tool_count(), 1);
    }

    #[tokio::test]
    async fn empty_name_is_a_registration_error() {
        let registry = ToolRegistry::new();
        let err = registry
            .register(definition("  ", Arc::new(Echo)))
            .unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
        assert_eq!(registry.tool_count(), 0);
    }

    #[tokio::test]
    async fn auth_required_tool_refuses_unauthenticated_context() {
        let registry = ToolRegistry::new();
        let invocations = Arc::new(AtomicU64::new(0));
        let mut def = definition(
            "guarded",
            Arc::new(Counting {
                invocations: invocations.clone(),
            }),
        );
        def.requires_auth = true;
        registry.register(def).unwrap();

        let result = registry
            .execute("guarded", json!({}), &ExecutionContext::default())
            .await;
        assert!(!result.success);
        assert_eq!(invocations.load(Ordering::SeqCst), 0);

        let ctx = ExecutionContext {
            authenticated: true,
            ..Default::default()
        };
        let result = registry.execute("guarded", json!({}), &ctx).await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn listing_is_sorted_and_omits_executors() {
        let registry = ToolRegistry::new();
        registry.register(definition("zeta", Arc::new(Echo))).unwrap();
        registry
            .register(definition("alpha", Arc::new(Echo)))
            .unwrap();

        let specs = registry.all_tools();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "alpha");
        assert_eq!(specs[1].name, "zeta");
    }
}
