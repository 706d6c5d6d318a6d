use contentgen_contracts::ContentPayload;
use serde_json::{Map, Value};

/// Reduces any `content` shape to one display string. Never fails.
///
/// Order: a string `raw` field wins, then any other object is shown as a
/// fenced JSON block, then plain text, then the JSON text of whatever is left.
pub fn normalize_content(content: &ContentPayload) -> String {
    match content {
        ContentPayload::StructuredPayload(map) => match map.get("raw") {
            Some(Value::String(raw)) => raw.clone(),
            _ => fenced_json(map),
        },
        ContentPayload::RawText(text) => text.clone(),
        ContentPayload::Other(value) => value_to_text(value),
    }
}

fn fenced_json(map: &Map<String, Value>) -> String {
    let pretty = serde_json::to_string_pretty(map).unwrap_or_else(|_| "{}".to_string());
    format!("```json\n{pretty}\n```")
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(raw) => raw.to_string(),
        Value::Number(raw) => raw.to_string(),
        Value::String(raw) => raw.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use contentgen_contracts::ContentPayload;
    use serde_json::json;

    use super::normalize_content;

    fn normalize(value: serde_json::Value) -> String {
        normalize_content(&ContentPayload::from(value))
    }

    #[test]
    fn raw_string_field_is_used_verbatim() {
        assert_eq!(normalize(json!({"raw": "# Hi"})), "# Hi");
        assert_eq!(
            normalize(json!({"raw": "body", "pydantic": null, "tasks_output": [1]})),
            "body"
        );
    }

    #[test]
    fn object_without_string_raw_becomes_fenced_json() {
        let text = normalize(json!({"foo": 1}));
        assert!(text.starts_with("```json\n"));
        assert!(text.contains("\"foo\": 1"));
        assert!(text.ends_with("\n```"));

        let non_string_raw = normalize(json!({"raw": 5}));
        assert!(non_string_raw.starts_with("```json\n"));
        assert!(non_string_raw.contains("\"raw\": 5"));
    }

    #[test]
    fn plain_string_is_used_verbatim() {
        assert_eq!(normalize(json!("  spaced\ntext ")), "  spaced\ntext ");
    }

    #[test]
    fn other_values_are_coerced() {
        assert_eq!(normalize(json!(42)), "42");
        assert_eq!(normalize(json!(1.5)), "1.5");
        assert_eq!(normalize(json!(true)), "true");
        assert_eq!(normalize(json!(null)), "null");
        assert_eq!(normalize(json!(["a", 1])), "[\"a\",1]");
    }

    #[test]
    fn absent_content_normalizes_like_null() {
        assert_eq!(normalize_content(&ContentPayload::default()), "null");
    }
}
