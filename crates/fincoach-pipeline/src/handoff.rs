use std::sync::Arc;
use std::time::Instant;

use fincoach_core::{ContextMap, HandoffRequest, HandoffResult, Message};
use fincoach_workers::WorkerRegistry;
use tracing::{info, warn};
use uuid::Uuid;

/// At or above this escalation level the caller should stop automated
/// handoffs and surface the task to the generalist or a human.
pub const ESCALATION_CEILING: u32 = 3;

/// Executes transfers of in-flight tasks between workers.
///
/// Owns both target validation and the context-merge contract, so the
/// agreement between two independently evolving workers lives in exactly
/// one place. Never raises: every failure mode becomes a failed
/// [`HandoffResult`] that still carries a fresh handoff id.
pub struct HandoffManager {
    registry: Arc<WorkerRegistry>,
}

impl HandoffManager {
    pub fn new(registry: Arc<WorkerRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute_handoff(
        &self,
        request: HandoffRequest,
        current_context: ContextMap,
    ) -> HandoffResult {
        let handoff_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let escalation_triggered = request.escalation_level >= ESCALATION_CEILING;

        if escalation_triggered {
            warn!(
                "Handoff {} at escalation level {}; caller should break the loop",
                handoff_id, request.escalation_level
            );
        }

        let target = match self.registry.worker(&request.to_worker) {
            Some(worker) if worker.is_active() && worker.is_initialized() => worker,
            Some(_) => {
                return self.failure(
                    &request,
                    handoff_id,
                    escalation_triggered,
                    started,
                    format!("Handoff target not active: {}", request.to_worker),
                );
            }
            None => {
                return self.failure(
                    &request,
                    handoff_id,
                    escalation_triggered,
                    started,
                    format!("Handoff target not found: {}", request.to_worker),
                );
            }
        };

        // Overlay the request's payload onto the caller's context; the
        // incoming request wins on key collision.
        let mut merged = current_context.clone();
        for (key, value) in request.context_payload.clone() {
            merged.insert(key, value);
        }

        let context_preserved =
            request.preserve_history && required_keys_survived(&request, &current_context, &merged);

        let history: Vec<Message> = merged
            .get("history")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        match target.respond(&request.user_message, &merged, &history).await {
            Ok(reply) => {
                self.registry
                    .record_handoff(&request.from_worker, &request.to_worker);
                self.registry
                    .record_interaction(&request.to_worker, true, reply.elapsed_ms, None);

                info!(
                    "Handoff {} complete: {} -> {} in {}ms",
                    handoff_id, request.from_worker, request.to_worker, reply.elapsed_ms
                );

                HandoffResult {
                    success: true,
                    handoff_id,
                    from_worker: request.from_worker,
                    to_worker: request.to_worker,
                    response: Some(reply.content),
                    context_preserved,
                    escalation_triggered,
                    duration_ms: started.elapsed().as_millis() as u64,
                    error: None,
                }
            }
            Err(err) => {
                let elapsed = started.elapsed().as_millis() as u64;
                self.registry
                    .record_interaction(&request.to_worker, false, elapsed, None);
                self.failure(
                    &request,
                    handoff_id,
                    escalation_triggered,
                    started,
                    err.to_string(),
                )
            }
        }
    }

    fn failure(
        &self,
        request: &HandoffRequest,
        handoff_id: String,
        escalation_triggered: bool,
        started: Instant,
        error: String,
    ) -> HandoffResult {
        warn!(
            "Handoff {} failed: {} -> {}: {}",
            handoff_id, request.from_worker, request.to_worker, error
        );
        HandoffResult {
            success: false,
            handoff_id,
            from_worker: request.from_worker.clone(),
            to_worker: request.to_worker.clone(),
            response: None,
            context_preserved: false,
            escalation_triggered,
            duration_ms: started.elapsed().as_millis() as u64,
            error: Some(error),
        }
    }
}

/// The keys required to survive the merge: everything in the request's
/// payload, plus the running conversation history if the caller had one.
fn required_keys_survived(
    request: &HandoffRequest,
    current_context: &ContextMap,
    merged: &ContextMap,
) -> bool {
    let payload_keys = request.context_payload.keys();
    let history_key = current_context.contains_key("history").then_some("history");

    payload_keys
        .map(String::as_str)
        .chain(history_key)
        .all(|key| merged.contains_key(key))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use fincoach_core::{
        AgentError, ChatOptions, ChatProvider, HandoffPriority,
    };
    use fincoach_tools::ToolRegistry;
    use fincoach_workers::default_workers;
    use serde_json::json;

    use super::*;

    struct EchoContextProvider;

    #[async_trait]
    impl ChatProvider for EchoContextProvider {
        async fn converse(
            &self,
            system_prompt: &str,
            user_message: &str,
            _history: &[Message],
            _options: &ChatOptions,
        ) -> Result<String, AgentError> {
            Ok(format!("{user_message} | {system_prompt}"))
        }

        async fn ping(&self) -> Result<(), AgentError> {
            Ok(())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ChatProvider for FailingProvider {
        async fn converse(
            &self,
            _system_prompt: &str,
            _user_message: &str,
            _history: &[Message],
            _options: &ChatOptions,
        ) -> Result<String, AgentError> {
            Err(AgentError::Llm("provider exploded".into()))
        }

        async fn ping(&self) -> Result<(), AgentError> {
            Ok(())
        }
    }

    fn manager_with(provider: Arc<dyn ChatProvider>) -> (HandoffManager, Arc<WorkerRegistry>) {
        let registry = Arc::new(
            WorkerRegistry::initialize(
                default_workers(),
                provider,
                Arc::new(ToolRegistry::new()),
            )
            .unwrap(),
        );
        (HandoffManager::new(registry.clone()), registry)
    }

    fn request(to_worker: &str) -> HandoffRequest {
        HandoffRequest {
            from_worker: "finance_guide".into(),
            to_worker: to_worker.into(),
            user_id: "u1".into(),
            session_id: "s1".into(),
            reason: "specialist question".into(),
            priority: HandoffPriority::Medium,
            context_payload: ContextMap::new(),
            user_message: "how are my envelopes doing?".into(),
            preserve_history: false,
            escalation_level: 0,
            metadata: json!({}),
        }
    }

    #[tokio::test]
    async fn handoff_to_nonexistent_worker_fails_without_counting() {
        let (manager, registry) = manager_with(Arc::new(EchoContextProvider));

        let result = manager
            .execute_handoff(request("ghost"), ContextMap::new())
            .await;

        assert!(!result.success);
        assert!(!result.handoff_id.is_empty());
        assert!(result.error.unwrap().contains("not found"));
        assert_eq!(
            registry.worker_metrics("finance_guide").unwrap().handoff_count,
            0
        );
    }

    #[tokio::test]
    async fn handoff_to_inactive_worker_fails_without_counting() {
        let (manager, registry) = manager_with(Arc::new(EchoContextProvider));
        registry.set_active("budget_coach", false).unwrap();

        let result = manager
            .execute_handoff(request("budget_coach"), ContextMap::new())
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("not active"));
        assert_eq!(
            registry.worker_metrics("finance_guide").unwrap().handoff_count,
            0
        );
    }

    #[tokio::test]
    async fn successful_handoff_counts_once_and_answers() {
        let (manager, registry) = manager_with(Arc::new(EchoContextProvider));

        let result = manager
            .execute_handoff(request("budget_coach"), ContextMap::new())
            .await;

        assert!(result.success);
        assert!(!result.handoff_id.is_empty());
        assert!(result
            .response
            .unwrap()
            .starts_with("how are my envelopes doing?"));
        assert_eq!(
            registry.worker_metrics("finance_guide").unwrap().handoff_count,
            1
        );
        // The target worker's interaction is recorded too.
        assert_eq!(
            registry
                .worker_metrics("budget_coach")
                .unwrap()
                .total_interactions,
            1
        );
    }

    #[tokio::test]
    async fn handoff_ids_are_unique_per_attempt() {
        let (manager, _) = manager_with(Arc::new(EchoContextProvider));

        let mut ids = HashSet::new();
        for _ in 0..5 {
            let result = manager
                .execute_handoff(request("budget_coach"), ContextMap::new())
                .await;
            assert!(ids.insert(result.handoff_id));
        }
    }

    #[tokio::test]
    async fn request_payload_wins_on_key_collision() {
        let (manager, _) = manager_with(Arc::new(EchoContextProvider));

        let mut current = ContextMap::new();
        current.insert("goal".into(), json!("old goal"));
        current.insert("kept".into(), json!("still here"));

        let mut req = request("budget_coach");
        req.context_payload.insert("goal".into(), json!("new goal"));
        req.preserve_history = true;

        let result = manager.execute_handoff(req, current).await;

        assert!(result.success);
        assert!(result.context_preserved);
        // The merged context reaches the worker via the system prompt.
        let response = result.response.unwrap();
        assert!(response.contains("new goal"));
        assert!(!response.contains("old goal"));
        assert!(response.contains("still here"));
    }

    #[tokio::test]
    async fn context_preserved_is_false_without_preserve_history() {
        let (manager, _) = manager_with(Arc::new(EchoContextProvider));

        let result = manager
            .execute_handoff(request("budget_coach"), ContextMap::new())
            .await;
        assert!(result.success);
        assert!(!result.context_preserved);
    }

    #[tokio::test]
    async fn escalation_flag_trips_at_the_ceiling() {
        let (manager, _) = manager_with(Arc::new(EchoContextProvider));

        let mut req = request("budget_coach");
        req.escalation_level = ESCALATION_CEILING;
        let result = manager.execute_handoff(req, ContextMap::new()).await;
        assert!(result.escalation_triggered);

        let mut req = request("budget_coach");
        req.escalation_level = ESCALATION_CEILING - 1;
        let result = manager.execute_handoff(req, ContextMap::new()).await;
        assert!(!result.escalation_triggered);
    }

    #[tokio::test]
    async fn worker_turn_failure_becomes_a_failed_result() {
        let (manager, registry) = manager_with(Arc::new(FailingProvider));

        let result = manager
            .execute_handoff(request("budget_coach"), ContextMap::new())
            .await;

        assert!(!result.success);
        assert_eq!(result.from_worker, "finance_guide");
        assert_eq!(result.to_worker, "budget_coach");
        assert!(result.error.unwrap().contains("provider exploded"));
        // The failed turn counts against the target's metrics.
        assert_eq!(
            registry.worker_metrics("budget_coach").unwrap().error_count,
            1
        );
    }
}
