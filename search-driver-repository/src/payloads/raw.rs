//! Dot-path JSON document builder.

use serde_json::{Map, Value};

/// A nested JSON object written through dot-separated paths.
///
/// `set("body.query.bool", v)` creates `body` and `query` as objects when
/// they are missing, replacing any non-object value found on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayload {
    payload: Map<String, Value>,
}

impl RawPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` at `path`.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        *self.slot(path) = value.into();
        self
    }

    /// Write `value` unless it is null, an empty string, array or object.
    pub fn set_if_not_empty(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        if !is_empty_value(&value) {
            self.set(path, value);
        }
        self
    }

    /// Write `value` unless it is null (or `None`).
    pub fn set_if_not_null(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        if !value.is_null() {
            self.set(path, value);
        }
        self
    }

    /// Append `value` to the array at `path`, creating it when absent.
    ///
    /// A scalar already stored at `path` becomes the first element.
    pub fn add(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let slot = self.slot(path);
        if slot.is_null() {
            *slot = Value::Array(vec![value]);
        } else if let Value::Array(items) = slot {
            items.push(value);
        } else {
            let previous = slot.take();
            *slot = Value::Array(vec![previous, value]);
        }
        self
    }

    pub fn add_if_not_empty(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        if !is_empty_value(&value) {
            self.add(path, value);
        }
        self
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.payload.get(first)?, |current, segment| {
            current.get(segment)
        })
    }

    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.payload)
    }

    /// The value slot at `path`, creating intermediate objects. New leaves are null.
    fn slot(&mut self, path: &str) -> &mut Value {
        let mut segments = path.split('.');
        // split always yields at least one segment
        let first = segments.next().unwrap_or_default();
        let mut current = self.payload.entry(first).or_insert(Value::Null);
        for segment in segments {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            current = &mut current[segment];
        }
        current
    }
}

impl From<Map<String, Value>> for RawPayload {
    fn from(payload: Map<String, Value>) -> Self {
        Self { payload }
    }
}

/// Null, `""`, `[]` and `{}` count as empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
