//! Parsed view over a raw search response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::highlight::Highlight;

/// A single hit: the document's external id and optional highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: Option<f64>,
    pub highlight: Option<Highlight>,
}

/// Total hit count plus hits in engine order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub total: u64,
    pub hits: Vec<SearchHit>,
}

impl SearchResults {
    /// Parse a raw response. Returns `None` when it has no `hits` section.
    ///
    /// The total may be a plain number or an object with a `value` field,
    /// depending on the engine version.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let hits = raw.get("hits")?;
        let total = total_hits(hits.get("total")?)?;

        let hits = hits
            .get("hits")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_hit).collect())
            .unwrap_or_default();

        Some(Self { total, hits })
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// External ids in hit order.
    pub fn ids(&self) -> Vec<String> {
        self.hits.iter().map(|h| h.id.clone()).collect()
    }
}

/// Read a `hits.total` value in either of its shapes.
pub fn total_hits(total: &Value) -> Option<u64> {
    match total {
        Value::Number(n) => n.as_u64(),
        Value::Object(o) => o.get("value").and_then(Value::as_u64),
        _ => None,
    }
}

fn parse_hit(hit: &Value) -> Option<SearchHit> {
    let id = match hit.get("_id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    Some(SearchHit {
        id,
        score: hit.get("_score").and_then(Value::as_f64),
        highlight: hit.get("highlight").and_then(Highlight::from_value),
    })
}
