//! Search builder.
//!
//! Collects the free-text query, filters, sort orders, paging and field
//! selection for one search against a model type.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use search_driver_shared::{Filter, Operator, SortDirection, SortOrder};
use serde_json::Value;

use crate::interfaces::{SearchCallback, SearchRule, Searchable};

/// Which soft-deleted documents a search should see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashedScope {
    /// Live documents only.
    #[default]
    Exclude,
    /// Live and soft-deleted documents.
    Include,
    /// Soft-deleted documents only.
    Only,
}

/// The model-independent part of a search request.
///
/// Search rules receive this view when building their query payloads.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    pub query: String,
    pub filters: Vec<Filter>,
    pub orders: Vec<SortOrder>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub select: Vec<String>,
    pub trashed: TrashedScope,
}

impl QuerySpec {
    /// A blank or `*` query matches everything and only applies filters.
    pub fn is_filter_only(&self) -> bool {
        let query = self.query.trim();
        query.is_empty() || query == "*"
    }
}

/// Search request against documents of model type `M`.
pub struct SearchBuilder<M: Searchable> {
    spec: QuerySpec,
    rules: Option<Vec<Arc<dyn SearchRule>>>,
    callback: Option<Arc<dyn SearchCallback>>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Searchable> SearchBuilder<M> {
    /// Create a builder for a free-text query. Use `*` for a filter-only search.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            spec: QuerySpec {
                query: query.into(),
                ..QuerySpec::default()
            },
            rules: None,
            callback: None,
            _model: PhantomData,
        }
    }

    /// Create a filter-only builder.
    pub fn filter_only() -> Self {
        Self::new("*")
    }

    /// Append a pre-rendered filter clause.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.spec.filters.push(filter);
        self
    }

    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::where_eq(field, value))
    }

    pub fn where_op(self, field: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.filter(Filter::where_op(field, op, value))
    }

    pub fn where_in<V: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.filter(Filter::where_in(field, values))
    }

    pub fn where_not_in<V: Into<Value>>(
        self,
        field: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filter(Filter::where_not_in(field, values))
    }

    pub fn where_between(self, field: &str, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        self.filter(Filter::where_between(field, from, to))
    }

    pub fn where_not_between(
        self,
        field: &str,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        self.filter(Filter::where_not_between(field, from, to))
    }

    pub fn where_exists(self, field: &str) -> Self {
        self.filter(Filter::where_exists(field))
    }

    pub fn where_not_exists(self, field: &str) -> Self {
        self.filter(Filter::where_not_exists(field))
    }

    pub fn where_regexp(self, field: &str, pattern: &str) -> Self {
        self.filter(Filter::where_regexp(field, pattern))
    }

    pub fn where_match(self, field: &str, text: impl Into<Value>) -> Self {
        self.filter(Filter::where_match(field, text))
    }

    pub fn where_match_any<S: AsRef<str>>(
        self,
        field: &str,
        words: impl IntoIterator<Item = S>,
    ) -> Self {
        self.filter(Filter::where_match_any(field, words))
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.spec.orders.push(SortOrder::new(field, direction));
        self
    }

    /// Maximum number of hits.
    pub fn take(mut self, limit: usize) -> Self {
        self.spec.limit = Some(limit);
        self
    }

    /// Number of hits to skip.
    pub fn skip(mut self, offset: usize) -> Self {
        self.spec.offset = Some(offset);
        self
    }

    /// Restrict returned source fields (and loaded model columns).
    pub fn select<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.spec.select = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_trashed(mut self) -> Self {
        self.spec.trashed = TrashedScope::Include;
        self
    }

    pub fn only_trashed(mut self) -> Self {
        self.spec.trashed = TrashedScope::Only;
        self
    }

    /// Append a search rule, replacing the model's defaults.
    pub fn rule(mut self, rule: Arc<dyn SearchRule>) -> Self {
        self.rules.get_or_insert_with(Vec::new).push(rule);
        self
    }

    /// Bypass execution and hand the built payload to `callback`.
    pub fn callback(mut self, callback: Arc<dyn SearchCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn query(&self) -> &str {
        &self.spec.query
    }

    pub(crate) fn callback_ref(&self) -> Option<&Arc<dyn SearchCallback>> {
        self.callback.as_ref()
    }

    /// Rules to try: the builder's own, or the model's defaults.
    pub fn effective_rules(&self) -> Vec<Arc<dyn SearchRule>> {
        match &self.rules {
            Some(rules) => rules.clone(),
            None => M::search_rules(),
        }
    }
}

impl<M: Searchable> Clone for SearchBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            rules: self.rules.clone(),
            callback: self.callback.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Searchable> fmt::Debug for SearchBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchBuilder")
            .field("model", &M::searchable_as())
            .field("spec", &self.spec)
            .field("rules", &self.rules.as_ref().map(Vec::len))
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Post;
    use search_driver_shared::ClauseGroup;

    #[test]
    fn test_builder_collects_in_order() {
        let builder = SearchBuilder::<Post>::new("rust")
            .where_eq("published", true)
            .where_not_in("status", vec!["draft"])
            .order_by("created_at", SortDirection::Desc)
            .order_by("id", SortDirection::Asc)
            .take(20)
            .skip(40)
            .select(["id", "title"]);

        let spec = builder.spec();
        assert_eq!(spec.query, "rust");
        assert_eq!(spec.filters.len(), 2);
        assert_eq!(spec.filters[1].group, ClauseGroup::MustNot);
        assert_eq!(spec.orders[0].field, "created_at");
        assert_eq!(spec.limit, Some(20));
        assert_eq!(spec.offset, Some(40));
        assert_eq!(spec.select, vec!["id", "title"]);
        assert_eq!(spec.trashed, TrashedScope::Exclude);
    }

    #[test]
    fn test_filter_only_queries() {
        assert!(SearchBuilder::<Post>::filter_only().spec().is_filter_only());
        assert!(SearchBuilder::<Post>::new("  ").spec().is_filter_only());
        assert!(!SearchBuilder::<Post>::new("rust").spec().is_filter_only());
    }

    #[test]
    fn test_rule_override_replaces_model_rules() {
        let builder = SearchBuilder::<Post>::new("rust");
        assert_eq!(builder.effective_rules().len(), 2);

        let builder = builder.rule(Arc::new(crate::rules::MatchAllRule));
        assert_eq!(builder.effective_rules().len(), 1);
    }

    #[test]
    fn test_trashed_scope() {
        let builder = SearchBuilder::<Post>::new("x").with_trashed();
        assert_eq!(builder.spec().trashed, TrashedScope::Include);
        let builder = builder.only_trashed();
        assert_eq!(builder.spec().trashed, TrashedScope::Only);
    }
}
