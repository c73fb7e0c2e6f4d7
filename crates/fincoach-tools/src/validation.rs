//! JSON Schema validation of tool parameters.
//!
//! Schemas are compiled once at registration time, so a malformed schema
//! is a startup failure rather than a per-call surprise.

use fincoach_core::AgentError;
use jsonschema::{Draft, Validator};
use serde_json::Value;

pub(crate) fn compile_schema(schema: &Value) -> Result<Validator, AgentError> {
    if !schema.is_object() {
        return Err(AgentError::Config(
            "parameter schema must be a JSON object".into(),
        ));
    }

    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(schema)
        .map_err(|e| AgentError::Config(format!("Failed to compile parameter schema: {e}")))
}

pub(crate) fn validate_params(validator: &Validator, params: &Value) -> Result<(), AgentError> {
    let errors: Vec<String> = validator.iter_errors(params).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AgentError::Validation(format!(
            "Parameter validation failed: {}",
            errors.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "envelope": { "type": "string" },
                "amount": { "type": "number", "minimum": 0 }
            },
            "required": ["envelope"]
        })
    }

    #[test]
    fn accepts_conforming_params() {
        let validator = compile_schema(&schema()).unwrap();
        let params = json!({ "envelope": "groceries", "amount": 42.5 });
        assert!(validate_params(&validator, &params).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let validator = compile_schema(&schema()).unwrap();
        let err = validate_params(&validator, &json!({ "amount": 10 })).unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
        assert!(err.to_string().contains("envelope"));
    }

    #[test]
    fn rejects_wrong_type() {
        let validator = compile_schema(&schema()).unwrap();
        let err = validate_params(&validator, &json!({ "envelope": 7 })).unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[test]
    fn non_object_schema_is_a_config_error() {
        let err = compile_schema(&json!("not a schema")).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }
}
