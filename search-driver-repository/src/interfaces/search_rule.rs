//! Search rule trait definition.

use serde_json::Value;

use crate::builder::QuerySpec;

/// One strategy for turning a free-text query into a bool query.
///
/// A model declares an ordered list of rules; the engine builds one payload
/// per applicable rule and stops at the first that returns hits.
pub trait SearchRule: Send + Sync {
    /// Whether the rule applies to this query.
    fn is_applicable(&self, _spec: &QuerySpec) -> bool {
        true
    }

    /// Content placed at `body.query.bool`, e.g. `{ "must": { ... } }`.
    fn build_query_payload(&self, spec: &QuerySpec) -> Option<Value>;

    /// Content placed at `body.highlight`.
    fn build_highlight_payload(&self, _spec: &QuerySpec) -> Option<Value> {
        None
    }
}
