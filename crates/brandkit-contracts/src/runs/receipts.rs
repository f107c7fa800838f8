use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::brand::GenerationOutcome;
use crate::form::FormInput;

pub const RECEIPT_SCHEMA_VERSION: u64 = 1;

const SECRET_KEYS: &[&str] = &["api_key", "authorization", "key", "x-goog-api-key"];

/// Everything that went into one generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub input: FormInput,
    pub prompt: String,
    pub provider: String,
    pub model: String,
    pub requested_model: Option<String>,
    pub fallback_reason: Option<String>,
}

pub fn build_receipt(
    request: &GenerationRequest,
    provider_request: &Map<String, Value>,
    provider_response: &Map<String, Value>,
    warnings: &[String],
    outcome: &GenerationOutcome,
    receipt_path: &Path,
) -> Value {
    let mut root = Map::new();
    root.insert(
        "schema_version".to_string(),
        Value::Number(RECEIPT_SCHEMA_VERSION.into()),
    );
    root.insert(
        "request".to_string(),
        sanitize_payload(&serde_json::to_value(request).unwrap_or(Value::Null)),
    );
    root.insert(
        "provider_request".to_string(),
        sanitize_payload(&Value::Object(provider_request.clone())),
    );
    root.insert(
        "provider_response".to_string(),
        sanitize_payload(&Value::Object(provider_response.clone())),
    );
    root.insert(
        "warnings".to_string(),
        Value::Array(warnings.iter().cloned().map(Value::String).collect()),
    );
    root.insert(
        "outcome".to_string(),
        serde_json::to_value(outcome).unwrap_or(Value::Null),
    );
    root.insert(
        "receipt_path".to_string(),
        Value::String(receipt_path.to_string_lossy().to_string()),
    );
    Value::Object(root)
}

pub fn write_receipt(path: &Path, payload: &Value) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(payload)?)
        .with_context(|| format!("writing receipt {}", path.display()))?;
    Ok(())
}

/// Replaces credential-bearing keys with `<omitted>` at any depth.
pub fn sanitize_payload(value: &Value) -> Value {
    match value {
        Value::Array(rows) => Value::Array(rows.iter().map(sanitize_payload).collect()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, row) in map {
                let lowered = key.to_ascii_lowercase();
                if SECRET_KEYS.contains(&lowered.as_str()) {
                    out.insert(key.clone(), Value::String("<omitted>".to_string()));
                    continue;
                }
                out.insert(key.clone(), sanitize_payload(row));
            }
            Value::Object(out)
        }
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use crate::brand::GenerationOutcome;
    use crate::catalog::{Industry, Tone, Touchpoint};
    use crate::form::FormInput;

    use super::*;

    #[test]
    fn receipt_has_expected_shape_and_hides_secrets() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let receipt_path = temp.path().join("receipt-1.json");
        let request = GenerationRequest {
            input: FormInput {
                brand_name: "Orbit".to_string(),
                industry: Some(Industry::Technology),
                touchpoint: Some(Touchpoint::MobileApp),
                selected_tones: vec![Tone::Bold],
                negative_preference: String::new(),
            },
            prompt: "design a brand".to_string(),
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            requested_model: None,
            fallback_reason: Some("No model specified; using default.".to_string()),
        };
        let mut provider_request = Map::new();
        provider_request.insert("endpoint".to_string(), json!("https://api.example/v1"));
        provider_request.insert(
            "headers".to_string(),
            json!({ "Authorization": "Bearer sk-secret", "Content-Type": "application/json" }),
        );
        let mut provider_response = Map::new();
        provider_response.insert("status".to_string(), json!(200));
        let outcome = GenerationOutcome::failed("boom", 3001);

        let payload = build_receipt(
            &request,
            &provider_request,
            &provider_response,
            &["slow".to_string()],
            &outcome,
            &receipt_path,
        );
        write_receipt(&receipt_path, &payload)?;

        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&receipt_path)?)?;
        assert_eq!(parsed["schema_version"], json!(RECEIPT_SCHEMA_VERSION));
        assert_eq!(parsed["request"]["input"]["brand_name"], json!("Orbit"));
        assert_eq!(
            parsed["provider_request"]["headers"]["Authorization"],
            json!("<omitted>")
        );
        assert_eq!(
            parsed["provider_request"]["headers"]["Content-Type"],
            json!("application/json")
        );
        assert_eq!(parsed["outcome"]["error"], json!("boom"));
        assert_eq!(parsed["outcome"]["elapsed_ms"], json!(3001));
        assert_eq!(parsed["warnings"], json!(["slow"]));
        Ok(())
    }

    #[test]
    fn sanitize_walks_arrays() {
        let cleaned = sanitize_payload(&json!([{ "key": "abc", "keep": 1 }]));
        assert_eq!(cleaned, json!([{ "key": "<omitted>", "keep": 1 }]));
    }
}
