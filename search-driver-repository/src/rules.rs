//! Built-in search rules.
//!
//! Models list these in `Searchable::search_rules`, usually from strictest to
//! loosest, so the engine can fall back when a stricter rule finds nothing.

use serde_json::{json, Value};

use crate::builder::QuerySpec;
use crate::interfaces::SearchRule;

/// `query_string` over the raw query text. The default rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryStringRule;

impl SearchRule for QueryStringRule {
    fn build_query_payload(&self, spec: &QuerySpec) -> Option<Value> {
        Some(json!({
            "must": {
                "query_string": { "query": spec.query }
            }
        }))
    }
}

/// `query_string` with the query wrapped in wildcards (`*query*`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WildcardRule;

impl SearchRule for WildcardRule {
    fn is_applicable(&self, spec: &QuerySpec) -> bool {
        !spec.query.trim().is_empty()
    }

    fn build_query_payload(&self, spec: &QuerySpec) -> Option<Value> {
        Some(json!({
            "must": {
                "query_string": { "query": format!("*{}*", spec.query.trim()) }
            }
        }))
    }
}

/// Fuzzy `multi_match` over a set of fields, tolerating minor typos.
///
/// Optionally highlights matches in the same fields.
#[derive(Debug, Clone, Default)]
pub struct FuzzyRule {
    fields: Vec<String>,
    highlight: bool,
}

impl FuzzyRule {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            highlight: false,
        }
    }

    pub fn with_highlight(mut self) -> Self {
        self.highlight = true;
        self
    }
}

impl SearchRule for FuzzyRule {
    fn is_applicable(&self, spec: &QuerySpec) -> bool {
        !self.fields.is_empty() && !spec.query.trim().is_empty()
    }

    fn build_query_payload(&self, spec: &QuerySpec) -> Option<Value> {
        // AUTO: 0 edits for 1-2 chars, 1 for 3-5, 2 above
        Some(json!({
            "must": {
                "multi_match": {
                    "query": spec.query,
                    "fields": self.fields,
                    "fuzziness": "AUTO"
                }
            }
        }))
    }

    fn build_highlight_payload(&self, _spec: &QuerySpec) -> Option<Value> {
        if !self.highlight {
            return None;
        }

        let fields: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (strip_boost(f).to_string(), json!({})))
            .collect();

        Some(json!({ "fields": fields }))
    }
}

/// Matches every document. Useful as the last fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAllRule;

impl SearchRule for MatchAllRule {
    fn build_query_payload(&self, _spec: &QuerySpec) -> Option<Value> {
        Some(json!({ "must": { "match_all": {} } }))
    }
}

/// `title^2` -> `title`
fn strip_boost(field: &str) -> &str {
    field.split('^').next().unwrap_or(field)
}
