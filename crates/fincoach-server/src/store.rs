use async_trait::async_trait;
use dashmap::DashMap;
use fincoach_core::{AgentError, CategorizationHeuristics, CategorySuggestion, PersistenceStore};
use serde_json::Value;

/// In-process record store. Stands in for the real financial-data backend
/// during development and in the test suite; swap the `PersistenceStore`
/// given to the composition root to point at a real database.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceStore for MemoryStore {
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

/// Merchant keywords mapped to the envelope vocabulary they usually
/// belong to. Matched case-insensitively against the transaction's
/// merchant and description fields.
const KEYWORD_HINTS: &[(&str, &str)] = &[
    ("grocer", "groceries"),
    ("supermarket", "groceries"),
    ("market", "groceries"),
    ("coffee", "dining"),
    ("restaurant", "dining"),
    ("cafe", "dining"),
    ("uber", "transport"),
    ("lyft", "transport"),
    ("gas", "transport"),
    ("fuel", "transport"),
    ("pharmacy", "health"),
    ("gym", "health"),
    ("netflix", "subscriptions"),
    ("spotify", "subscriptions"),
    ("rent", "housing"),
    ("electric", "utilities"),
    ("water", "utilities"),
];

/// Keyword categorizer over the transaction's merchant/description text.
///
/// A direct envelope-name match beats a keyword hint. Suggestions come
/// back ordered by confidence; an empty list means no heuristic fired.
pub struct KeywordCategorizer;

#[async_trait]
impl CategorizationHeuristics for KeywordCategorizer {
    async fn suggest(
        &self,
        transaction: &Value,
        envelopes: &[String],
    ) -> Result<Vec<CategorySuggestion>, AgentError> {
        let text = [
            transaction.get("merchant"),
            transaction.get("description"),
        ]
        .iter()
        .filter_map(|v| v.and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut suggestions = Vec::new();

        for envelope in envelopes {
            if text.contains(&envelope.to_lowercase()) {
                suggestions.push(CategorySuggestion {
                    envelope: envelope.clone(),
                    confidence: 0.9,
                    source: "name".into(),
                });
            }
        }

        for (keyword, hint) in KEYWORD_HINTS {
            if !text.contains(keyword) {
                continue;
            }
            let matched = envelopes
                .iter()
                .find(|e| e.to_lowercase().contains(hint))
                .cloned();
            if let Some(envelope) = matched {
                if !suggestions.iter().any(|s| s.envelope == envelope) {
                    suggestions.push(CategorySuggestion {
                        envelope,
                        confidence: 0.6,
                        source: "keyword".into(),
                    });
                }
            }
        }

        suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn envelopes() -> Vec<String> {
        vec!["Groceries".into(), "Dining Out".into(), "Transport".into()]
    }

    #[tokio::test]
    async fn store_round_trips_values() {
        let store = MemoryStore::new();
        store.put("k", json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"a": 1})));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn envelope_name_match_outranks_keyword_hint() {
        let suggestions = KeywordCategorizer
            .suggest(
                &json!({"merchant": "Groceries R Us", "description": "coffee beans"}),
                &envelopes(),
            )
            .await
            .unwrap();

        assert_eq!(suggestions[0].envelope, "Groceries");
        assert_eq!(suggestions[0].source, "name");
        assert!(suggestions
            .iter()
            .any(|s| s.envelope == "Dining Out" && s.source == "keyword"));
    }

    #[tokio::test]
    async fn keyword_hint_matches_partial_envelope_names() {
        let suggestions = KeywordCategorizer
            .suggest(&json!({"merchant": "Blue Bottle Coffee"}), &envelopes())
            .await
            .unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].envelope, "Dining Out");
        assert_eq!(suggestions[0].confidence, 0.6);
    }

    #[tokio::test]
    async fn unmatched_transaction_yields_no_suggestions() {
        let suggestions = KeywordCategorizer
            .suggest(&json!({"merchant": "Mystery Shop"}), &envelopes())
            .await
            .unwrap();
        assert!(suggestions.is_empty());
    }
}
