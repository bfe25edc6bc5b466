//! Search engine driver.
//!
//! This module provides the main entry point used by application code to
//! index models and to search them: `ElasticEngine`.

use std::collections::HashMap;
use std::sync::Arc;

use search_driver_shared::{group_filters, total_hits, Filter, Highlight, SearchResults, SortOrder};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::builder::{SearchBuilder, TrashedScope};
use crate::config::EngineConfig;
use crate::errors::SearchError;
use crate::indexers::Indexer;
use crate::interfaces::{ModelStore, SearchTransport, Searchable, SOFT_DELETED_FIELD};
use crate::mapping::MappingSync;
use crate::payloads::Payload;

/// A model loaded for a hit, with the hit's highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHit<M> {
    pub model: M,
    pub highlight: Option<Highlight>,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResults {
    /// Raw engine response.
    pub results: Value,
    pub total: u64,
    pub per_page: usize,
    pub page: usize,
    /// `total / per_page`, rounded up.
    pub total_pages: u64,
}

/// Per-call options layered over the builder.
#[derive(Debug, Clone, Copy, Default)]
struct SearchOptions {
    from: Option<usize>,
    size: Option<usize>,
    explain: bool,
    profile: bool,
    count: bool,
}

/// Indexes models into, and searches them in, one search engine index.
pub struct ElasticEngine {
    transport: Arc<dyn SearchTransport>,
    config: EngineConfig,
    indexer: Indexer,
    mappings: MappingSync,
}

impl ElasticEngine {
    /// Create an engine without touching the index.
    pub fn new(transport: Arc<dyn SearchTransport>, config: EngineConfig) -> Self {
        let indexer = Indexer::from_config(&config);
        Self {
            transport,
            config,
            indexer,
            mappings: MappingSync::new(),
        }
    }

    /// Create an engine and make sure its index exists with a large enough
    /// result window.
    ///
    /// # Arguments
    ///
    /// * `transport` - The transport used for every engine request
    /// * `config` - Index name, indexing strategy and write options
    ///
    /// # Returns
    ///
    /// * `Ok(ElasticEngine)` - An engine whose index is ready
    /// * `Err(SearchError)` - If the index cannot be checked, created or configured
    pub async fn connect(
        transport: Arc<dyn SearchTransport>,
        config: EngineConfig,
    ) -> Result<Self, SearchError> {
        let engine = Self::new(transport, config);
        engine.ensure_index().await?;
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transport(&self) -> &dyn SearchTransport {
        self.transport.as_ref()
    }

    /// Create the index if missing and raise `max_result_window` when it is
    /// unset or lower than configured.
    #[instrument(skip(self), fields(index = %self.config.index))]
    pub async fn ensure_index(&self) -> Result<(), SearchError> {
        let index = &self.config.index;
        let max_result_window = self.config.max_result_window;

        let mut params = Payload::index(index);
        params.set("body.settings.max_result_window", max_result_window);

        if !self.transport.index_exists(index).await? {
            self.transport.create_index(params.clone().into_value()).await?;
            info!(max_result_window = max_result_window, "Created index");
        }

        let settings = self.transport.get_settings(index).await?;
        let current = settings
            .get(index.as_str())
            .and_then(|s| s.pointer("/settings/index/max_result_window"))
            .and_then(as_u64_lenient);

        if current.map_or(true, |window| window < max_result_window) {
            self.transport.put_settings(params.into_value()).await?;
            info!(
                previous = ?current,
                max_result_window = max_result_window,
                "Raised max_result_window"
            );
        }

        Ok(())
    }

    /// Index the given models, pushing the type's mapping first if needed.
    pub async fn update<M: Searchable>(&self, models: &[M]) -> Result<(), SearchError> {
        if models.is_empty() {
            return Ok(());
        }

        if self.config.update_mapping {
            self.mappings
                .ensure::<M>(self.transport(), &self.config.index, self.config.soft_delete)
                .await?;
        }

        self.indexer.update(self.transport(), models).await
    }

    /// Remove the given models from the index.
    pub async fn delete<M: Searchable>(&self, models: &[M]) -> Result<(), SearchError> {
        if models.is_empty() {
            return Ok(());
        }

        self.indexer.delete(self.transport(), models).await
    }

    /// Run the builder's search, with its limit and offset.
    #[instrument(skip(self, builder), fields(model = %M::searchable_as(), query = %builder.query()))]
    pub async fn search<M: Searchable>(
        &self,
        builder: &SearchBuilder<M>,
    ) -> Result<Value, SearchError> {
        let options = Self::builder_options(builder);
        self.perform_search(builder, options).await
    }

    /// Run one page of the builder's search. Pages start at 1.
    #[instrument(skip(self, builder), fields(model = %M::searchable_as(), query = %builder.query()))]
    pub async fn paginate<M: Searchable>(
        &self,
        builder: &SearchBuilder<M>,
        per_page: usize,
        page: usize,
    ) -> Result<PaginatedResults, SearchError> {
        if per_page == 0 {
            return Err(SearchError::invalid_query("per_page must be at least 1"));
        }
        if page == 0 {
            return Err(SearchError::invalid_query("page numbers start at 1"));
        }

        let from = page_offset(per_page, page)
            .ok_or_else(|| SearchError::invalid_query("page offset overflows"))?;

        let options = SearchOptions {
            from: Some(from),
            size: Some(per_page),
            ..SearchOptions::default()
        };

        let results = self.perform_search(builder, options).await?;
        let total = Self::get_total_count(&results)?;

        Ok(PaginatedResults {
            results,
            total,
            per_page,
            page,
            total_pages: total.div_ceil(per_page as u64),
        })
    }

    /// Run the search with per-hit score explanations.
    #[instrument(skip(self, builder), fields(model = %M::searchable_as(), query = %builder.query()))]
    pub async fn explain<M: Searchable>(
        &self,
        builder: &SearchBuilder<M>,
    ) -> Result<Value, SearchError> {
        let options = SearchOptions {
            explain: true,
            ..Self::builder_options(builder)
        };
        self.perform_search(builder, options).await
    }

    /// Run the search with query profiling.
    #[instrument(skip(self, builder), fields(model = %M::searchable_as(), query = %builder.query()))]
    pub async fn profile<M: Searchable>(
        &self,
        builder: &SearchBuilder<M>,
    ) -> Result<Value, SearchError> {
        let options = SearchOptions {
            profile: true,
            ..Self::builder_options(builder)
        };
        self.perform_search(builder, options).await
    }

    /// Count matching documents. The first rule with a non-zero count wins.
    #[instrument(skip(self, builder), fields(model = %M::searchable_as(), query = %builder.query()))]
    pub async fn count<M: Searchable>(&self, builder: &SearchBuilder<M>) -> Result<u64, SearchError> {
        let options = SearchOptions {
            count: true,
            ..SearchOptions::default()
        };

        for payload in self.build_search_payloads(builder, options) {
            let response = self.transport.count(payload.into_value()).await?;
            let count = response
                .get("count")
                .and_then(Value::as_u64)
                .ok_or_else(|| SearchError::parse("count response has no count"))?;

            if count > 0 {
                return Ok(count);
            }
        }

        Ok(0)
    }

    /// Send a caller-built search body for model type `M`.
    pub async fn search_raw<M: Searchable>(&self, body: Value) -> Result<Value, SearchError> {
        let mut payload = Payload::typed::<M>(&self.config.index);
        payload.set("body", body);
        self.transport.search(payload.into_value()).await
    }

    /// Hit ids in engine order.
    pub fn map_ids(results: &Value) -> Result<Vec<String>, SearchError> {
        Ok(parse_results(results)?.ids())
    }

    /// Total hits reported by the engine.
    pub fn get_total_count(results: &Value) -> Result<u64, SearchError> {
        results
            .pointer("/hits/total")
            .and_then(total_hits)
            .ok_or_else(|| SearchError::parse("response has no hits.total"))
    }

    /// Load the models behind the hits, in hit order.
    ///
    /// A zero total returns an empty list without asking the store. Hits
    /// whose model no longer exists are dropped.
    pub async fn map<M, S>(
        &self,
        results: &Value,
        builder: &SearchBuilder<M>,
        store: &S,
    ) -> Result<Vec<ModelHit<M>>, SearchError>
    where
        M: Searchable,
        S: ModelStore<M> + ?Sized,
    {
        let results = parse_results(results)?;
        if results.is_empty() || results.hits.is_empty() {
            return Ok(Vec::new());
        }

        let keys = results.ids();
        let select = &builder.spec().select;
        let columns = (!select.is_empty()).then_some(select.as_slice());

        let models = store
            .find_by_keys(&keys, columns, M::uses_soft_delete())
            .await?;

        let mut by_key: HashMap<String, M> = models
            .into_iter()
            .filter_map(|model| model.search_key().map(|key| (key, model)))
            .collect();

        let mapped: Vec<ModelHit<M>> = results
            .hits
            .into_iter()
            .filter_map(|hit| {
                by_key.remove(&hit.id).map(|model| ModelHit {
                    model,
                    highlight: hit.highlight,
                })
            })
            .collect();

        if mapped.len() < keys.len() {
            debug!(
                hits = keys.len(),
                found = mapped.len(),
                "Dropped hits without a stored model"
            );
        }

        Ok(mapped)
    }

    /// Search and load the matching models.
    pub async fn get<M, S>(
        &self,
        builder: &SearchBuilder<M>,
        store: &S,
    ) -> Result<Vec<ModelHit<M>>, SearchError>
    where
        M: Searchable,
        S: ModelStore<M> + ?Sized,
    {
        let results = self.search(builder).await?;
        self.map(&results, builder, store).await
    }

    fn builder_options<M: Searchable>(builder: &SearchBuilder<M>) -> SearchOptions {
        SearchOptions {
            from: builder.spec().offset,
            size: builder.spec().limit,
            ..SearchOptions::default()
        }
    }

    /// Run candidates in order and return the first result with hits.
    async fn perform_search<M: Searchable>(
        &self,
        builder: &SearchBuilder<M>,
        options: SearchOptions,
    ) -> Result<Value, SearchError> {
        let payloads = self.build_search_payloads(builder, options);

        if let Some(callback) = builder.callback_ref() {
            // No applicable rule still hands over the builder's options.
            let payload = match payloads.into_iter().next() {
                Some(payload) => payload,
                None => self.match_all_payload(builder, options),
            };
            return callback
                .call(self.transport(), builder.query(), payload.into_value())
                .await;
        }

        let candidates = payloads.len();
        let mut last = None;

        for (position, payload) in payloads.into_iter().enumerate() {
            let result = self.transport.search(payload.into_value()).await?;
            let total = Self::get_total_count(&result)?;
            if total > 0 {
                debug!(rule = position, total = total, "Search rule matched");
                return Ok(result);
            }
            last = Some(result);
        }

        debug!(candidates = candidates, "No search rule matched");
        Ok(last.unwrap_or_else(empty_results))
    }

    /// One payload per applicable rule, or a single match-all payload for
    /// filter-only builders.
    fn build_search_payloads<M: Searchable>(
        &self,
        builder: &SearchBuilder<M>,
        options: SearchOptions,
    ) -> Vec<Payload> {
        let spec = builder.spec();

        if spec.is_filter_only() {
            return vec![self.match_all_payload(builder, options)];
        }

        let filters = group_filters(&self.filters::<M>(builder));

        builder
            .effective_rules()
            .iter()
            .filter(|rule| rule.is_applicable(spec))
            .map(|rule| {
                let mut payload = self.base_payload(builder, options);
                if let Some(query) = rule.build_query_payload(spec) {
                    payload.set_if_not_empty("body.query.bool", query);
                }
                if !options.count {
                    if let Some(highlight) = rule.build_highlight_payload(spec) {
                        payload.set_if_not_empty("body.highlight", highlight);
                    }
                }
                payload.set_if_not_empty("body.query.bool.filter.bool", filters.clone());
                payload
            })
            .collect()
    }

    /// Routing keys plus the builder's selection, sort, paging and flags.
    fn base_payload<M: Searchable>(
        &self,
        builder: &SearchBuilder<M>,
        options: SearchOptions,
    ) -> Payload {
        let spec = builder.spec();
        let mut payload = Payload::typed::<M>(&self.config.index);

        if !options.count {
            let sort: Vec<Value> = spec.orders.iter().map(SortOrder::to_clause).collect();
            payload
                .set_if_not_empty("body._source", spec.select.clone())
                .set_if_not_empty("body.sort", sort)
                .set_if_not_null("body.from", options.from)
                .set_if_not_null("body.size", options.size);
        }
        if options.explain {
            payload.set("body.explain", true);
        }
        if options.profile {
            payload.set("body.profile", true);
        }
        payload
    }

    /// Match-all query restricted by the builder's filters.
    fn match_all_payload<M: Searchable>(
        &self,
        builder: &SearchBuilder<M>,
        options: SearchOptions,
    ) -> Payload {
        let filters = group_filters(&self.filters::<M>(builder));
        let mut payload = self.base_payload(builder, options);
        payload
            .set("body.query.bool.must", json!({ "match_all": {} }))
            .set_if_not_empty("body.query.bool.filter.bool", filters);
        payload
    }

    /// The builder's filters plus the soft-delete scope.
    fn filters<M: Searchable>(&self, builder: &SearchBuilder<M>) -> Vec<Filter> {
        let spec = builder.spec();
        let mut filters = spec.filters.clone();

        if self.config.soft_delete && M::uses_soft_delete() {
            match spec.trashed {
                TrashedScope::Exclude => filters.push(Filter::where_eq(SOFT_DELETED_FIELD, 0)),
                TrashedScope::Only => filters.push(Filter::where_eq(SOFT_DELETED_FIELD, 1)),
                TrashedScope::Include => {}
            }
        }

        filters
    }
}

/// Offset of the first hit on a 1-based page. `None` on page 0 or overflow.
pub fn page_offset(per_page: usize, page: usize) -> Option<usize> {
    page.checked_sub(1)?.checked_mul(per_page)
}

fn parse_results(results: &Value) -> Result<SearchResults, SearchError> {
    SearchResults::from_value(results).ok_or_else(|| SearchError::parse("response has no hits"))
}

fn empty_results() -> Value {
    json!({ "hits": { "total": 0, "hits": [] } })
}

/// Settings values come back as strings.
fn as_u64_lenient(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
