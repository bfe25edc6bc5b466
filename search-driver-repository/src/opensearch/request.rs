//! Reading request parts out of engine payloads.

use opensearch::http::request::JsonBody;
use opensearch::params::Refresh;
use serde_json::Value;

use crate::errors::SearchError;

/// A string routing field such as `index` or `id`.
///
/// Numeric ids are accepted and rendered as strings.
pub(crate) fn field(payload: &Value, name: &str) -> Result<String, SearchError> {
    match payload.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(SearchError::invalid_query(format!(
            "payload has no `{}`",
            name
        ))),
    }
}

/// The request body, or an empty object.
pub(crate) fn body(payload: &Value) -> Value {
    payload
        .get("body")
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()))
}

/// NDJSON lines of a bulk payload.
pub(crate) fn bulk_lines(payload: &Value) -> Result<Vec<JsonBody<Value>>, SearchError> {
    let lines = payload
        .get("body")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::invalid_query("bulk payload body must be a list"))?;

    Ok(lines.iter().cloned().map(JsonBody::from).collect())
}

/// The `refresh` request parameter, if set.
pub(crate) fn refresh(payload: &Value) -> Option<Refresh> {
    match payload.get("refresh")? {
        Value::Bool(true) => Some(Refresh::True),
        Value::Bool(false) => Some(Refresh::False),
        Value::String(s) => match s.as_str() {
            "true" => Some(Refresh::True),
            "false" => Some(Refresh::False),
            "wait_for" => Some(Refresh::WaitFor),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field() {
        let payload = json!({ "index": "models", "id": 42, "type": "" });
        assert_eq!(field(&payload, "index").unwrap(), "models");
        assert_eq!(field(&payload, "id").unwrap(), "42");
        assert!(matches!(
            field(&payload, "type"),
            Err(SearchError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_body_defaults_to_empty_object() {
        assert_eq!(body(&json!({ "index": "models" })), json!({}));
        assert_eq!(
            body(&json!({ "body": { "query": {} } })),
            json!({ "query": {} })
        );
    }

    #[test]
    fn test_bulk_lines() {
        let payload = json!({
            "body": [{ "index": { "_id": "1" } }, { "title": "One" }]
        });
        assert_eq!(bulk_lines(&payload).unwrap().len(), 2);
        assert!(bulk_lines(&json!({ "body": {} })).is_err());
    }

    #[test]
    fn test_refresh() {
        assert!(matches!(
            refresh(&json!({ "refresh": "wait_for" })),
            Some(Refresh::WaitFor)
        ));
        assert!(matches!(refresh(&json!({ "refresh": true })), Some(Refresh::True)));
        assert!(refresh(&json!({ "refresh": "soon" })).is_none());
        assert!(refresh(&json!({})).is_none());
    }
}
