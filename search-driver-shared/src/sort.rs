//! Sort specification.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Direction of a sort clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// A single field + direction pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Render as the engine's `{ "field": "asc" }` form.
    pub fn to_clause(&self) -> Value {
        let mut clause = Map::new();
        clause.insert(self.field.clone(), json!(self.direction.as_str()));
        Value::Object(clause)
    }
}
