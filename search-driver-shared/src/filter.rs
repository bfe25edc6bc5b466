//! Filter clauses.
//!
//! Each clause is rendered to the engine's query DSL up front and tagged with
//! the boolean group it belongs to. The engine collects them under
//! `query.bool.filter.bool.<group>` so they restrict hits without affecting
//! scoring.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Boolean clause group a filter is placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseGroup {
    Must,
    MustNot,
}

impl ClauseGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseGroup::Must => "must",
            ClauseGroup::MustNot => "must_not",
        }
    }
}

/// Comparison operator accepted by [`Filter::where_op`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Eq),
            "<>" | "!=" => Ok(Operator::NotEq),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            other => Err(format!("unsupported operator '{}'", other)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        };
        f.write_str(op)
    }
}

/// A single rendered filter clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub group: ClauseGroup,
    pub clause: Value,
}

impl Filter {
    fn must(clause: Value) -> Self {
        Self {
            group: ClauseGroup::Must,
            clause,
        }
    }

    fn must_not(clause: Value) -> Self {
        Self {
            group: ClauseGroup::MustNot,
            clause,
        }
    }

    /// Exact term match.
    pub fn where_eq(field: &str, value: impl Into<Value>) -> Self {
        Self::must(keyed("term", field, value.into()))
    }

    /// Comparison against a single value.
    pub fn where_op(field: &str, op: Operator, value: impl Into<Value>) -> Self {
        let value = value.into();
        match op {
            Operator::Eq => Self::must(keyed("term", field, value)),
            Operator::NotEq => Self::must_not(keyed("term", field, value)),
            Operator::Gt => Self::must(keyed("range", field, json!({ "gt": value }))),
            Operator::Gte => Self::must(keyed("range", field, json!({ "gte": value }))),
            Operator::Lt => Self::must(keyed("range", field, json!({ "lt": value }))),
            Operator::Lte => Self::must(keyed("range", field, json!({ "lte": value }))),
        }
    }

    pub fn where_in<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::must(keyed("terms", field, collect_values(values)))
    }

    pub fn where_not_in<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::must_not(keyed("terms", field, collect_values(values)))
    }

    /// Inclusive range.
    pub fn where_between(field: &str, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Self::must(keyed(
            "range",
            field,
            json!({ "gte": from.into(), "lte": to.into() }),
        ))
    }

    pub fn where_not_between(field: &str, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Self::must_not(keyed(
            "range",
            field,
            json!({ "gte": from.into(), "lte": to.into() }),
        ))
    }

    pub fn where_exists(field: &str) -> Self {
        Self::must(json!({ "exists": { "field": field } }))
    }

    pub fn where_not_exists(field: &str) -> Self {
        Self::must_not(json!({ "exists": { "field": field } }))
    }

    pub fn where_regexp(field: &str, pattern: &str) -> Self {
        Self::must(keyed("regexp", field, json!({ "value": pattern })))
    }

    /// Phrase match on analyzed text.
    pub fn where_match(field: &str, text: impl Into<Value>) -> Self {
        Self::must(keyed("match_phrase", field, text.into()))
    }

    /// Match any of the given words (joined by a space).
    pub fn where_match_any<S: AsRef<str>>(field: &str, words: impl IntoIterator<Item = S>) -> Self {
        let joined = words
            .into_iter()
            .map(|w| w.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Self::must(keyed("match", field, Value::String(joined)))
    }
}

/// Group rendered filters into `{ "must": [...], "must_not": [...] }`.
///
/// Returns an empty object when there are no filters so callers can skip it.
pub fn group_filters(filters: &[Filter]) -> Value {
    let mut grouped = Map::new();
    for filter in filters {
        let entry = grouped
            .entry(filter.group.as_str())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(clauses) = entry {
            clauses.push(filter.clause.clone());
        }
    }
    Value::Object(grouped)
}

fn keyed(kind: &str, field: &str, value: Value) -> Value {
    let mut inner = Map::new();
    inner.insert(field.to_string(), value);
    let mut outer = Map::new();
    outer.insert(kind.to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn collect_values<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Value {
    Value::Array(values.into_iter().map(Into::into).collect())
}
