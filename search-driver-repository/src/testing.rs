//! Test doubles shared by the unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use crate::errors::SearchError;
use crate::interfaces::{ModelStore, SearchRule, SearchTransport, Searchable};
use crate::rules::{FuzzyRule, QueryStringRule};

/// Soft-deletable model with a mapping and two search rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: Option<String>,
    pub title: String,
    pub deleted: bool,
}

impl Post {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            title: title.to_string(),
            deleted: false,
        }
    }

    pub fn without_key(title: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            deleted: false,
        }
    }

    pub fn trashed(mut self) -> Self {
        self.deleted = true;
        self
    }
}

impl Searchable for Post {
    fn searchable_as() -> String {
        "posts".to_string()
    }

    fn search_key(&self) -> Option<String> {
        self.id.clone()
    }

    fn to_searchable_document(&self) -> Map<String, Value> {
        let mut document = Map::new();
        if !self.title.is_empty() {
            document.insert("title".to_string(), json!(self.title));
        }
        document
    }

    fn mapping() -> Map<String, Value> {
        let mut mapping = Map::new();
        mapping.insert(
            "properties".to_string(),
            json!({ "title": { "type": "text" } }),
        );
        mapping
    }

    fn uses_soft_delete() -> bool {
        true
    }

    fn is_trashed(&self) -> bool {
        self.deleted
    }

    fn search_rules() -> Vec<Arc<dyn SearchRule>> {
        vec![
            Arc::new(QueryStringRule),
            Arc::new(FuzzyRule::new(["title"]).with_highlight()),
        ]
    }
}

/// Plain model using every default.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

impl Tag {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

impl Searchable for Tag {
    fn searchable_as() -> String {
        "tags".to_string()
    }

    fn search_key(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn to_searchable_document(&self) -> Map<String, Value> {
        let mut document = Map::new();
        document.insert("name".to_string(), json!(self.name));
        document
    }
}

/// Transport that records every call and keeps written documents in memory.
///
/// Searches return queued responses first, then every stored document.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<(&'static str, Value)>>,
    documents: Mutex<BTreeMap<String, Value>>,
    search_responses: Mutex<VecDeque<Value>>,
    count_responses: Mutex<VecDeque<Value>>,
    settings: Mutex<Value>,
    index_exists: Mutex<bool>,
    failing: Option<&'static str>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            settings: Mutex::new(json!({})),
            ..Self::default()
        }
    }

    /// Every call to `operation` records the call, then fails.
    pub fn failing(operation: &'static str) -> Self {
        Self {
            failing: Some(operation),
            ..Self::new()
        }
    }

    /// An existing index whose settings report the given result window.
    pub fn with_index(index: &str, max_result_window: Option<&str>) -> Self {
        let settings = match max_result_window {
            Some(window) => json!({
                index: { "settings": { "index": { "max_result_window": window } } }
            }),
            None => json!({ index: { "settings": { "index": {} } } }),
        };
        Self {
            settings: Mutex::new(settings),
            index_exists: Mutex::new(true),
            ..Self::default()
        }
    }

    pub async fn push_search(&self, response: Value) {
        self.search_responses.lock().await.push_back(response);
    }

    pub async fn push_count(&self, count: u64) {
        self.count_responses
            .lock()
            .await
            .push_back(json!({ "count": count }));
    }

    pub async fn calls(&self) -> Vec<(&'static str, Value)> {
        self.calls.lock().await.clone()
    }

    pub async fn calls_to(&self, operation: &str) -> Vec<Value> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|(op, _)| *op == operation)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    async fn record(&self, operation: &'static str, payload: Value) -> Result<(), SearchError> {
        self.calls.lock().await.push((operation, payload));
        if self.failing == Some(operation) {
            return Err(failure(operation));
        }
        Ok(())
    }
}

fn failure(operation: &str) -> SearchError {
    let msg = format!("{} failed with status 500: mock failure", operation);
    match operation {
        "bulk" => SearchError::bulk_index(msg),
        "index" => SearchError::index(msg),
        "delete" => SearchError::delete(msg),
        "search" | "count" => SearchError::query(msg),
        "put_mapping" => SearchError::mapping(msg),
        "put_settings" | "get_settings" => SearchError::settings(msg),
        _ => SearchError::index_creation(msg),
    }
}

fn payload_id(payload: &Value) -> String {
    match &payload["id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SearchTransport for MockTransport {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        self.record("index_exists", json!(index)).await?;
        Ok(*self.index_exists.lock().await)
    }

    async fn create_index(&self, payload: Value) -> Result<(), SearchError> {
        self.record("create_index", payload).await?;
        *self.index_exists.lock().await = true;
        Ok(())
    }

    async fn get_settings(&self, index: &str) -> Result<Value, SearchError> {
        self.record("get_settings", json!(index)).await?;
        Ok(self.settings.lock().await.clone())
    }

    async fn put_settings(&self, payload: Value) -> Result<(), SearchError> {
        self.record("put_settings", payload).await
    }

    async fn put_mapping(&self, payload: Value) -> Result<(), SearchError> {
        self.record("put_mapping", payload).await
    }

    async fn bulk(&self, payload: Value) -> Result<Value, SearchError> {
        self.record("bulk", payload.clone()).await?;

        let lines = payload["body"].as_array().cloned().unwrap_or_default();
        let mut documents = self.documents.lock().await;
        let mut lines = lines.into_iter();
        while let Some(action) = lines.next() {
            if let Some(id) = action.pointer("/index/_id").and_then(Value::as_str) {
                let document = lines.next().unwrap_or(Value::Null);
                documents.insert(id.to_string(), document);
            } else if let Some(id) = action.pointer("/delete/_id").and_then(Value::as_str) {
                documents.remove(id);
            }
        }

        Ok(json!({ "errors": false, "items": [] }))
    }

    async fn index(&self, payload: Value) -> Result<(), SearchError> {
        self.record("index", payload.clone()).await?;
        self.documents
            .lock()
            .await
            .insert(payload_id(&payload), payload["body"].clone());
        Ok(())
    }

    async fn delete(&self, payload: Value) -> Result<(), SearchError> {
        self.record("delete", payload.clone()).await?;
        self.documents.lock().await.remove(&payload_id(&payload));
        Ok(())
    }

    async fn search(&self, payload: Value) -> Result<Value, SearchError> {
        self.record("search", payload).await?;

        if let Some(response) = self.search_responses.lock().await.pop_front() {
            return Ok(response);
        }

        let documents = self.documents.lock().await;
        let hits: Vec<Value> = documents
            .iter()
            .map(|(id, source)| json!({ "_id": id, "_source": source }))
            .collect();
        Ok(json!({ "hits": { "total": hits.len(), "hits": hits } }))
    }

    async fn count(&self, payload: Value) -> Result<Value, SearchError> {
        self.record("count", payload).await?;
        Ok(self
            .count_responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| json!({ "count": 0 })))
    }
}

/// In-memory primary store that records its lookups.
pub struct MemoryStore<M> {
    rows: Vec<M>,
    lookups: Mutex<Vec<(Vec<String>, Option<Vec<String>>, bool)>>,
}

impl<M> MemoryStore<M> {
    pub fn new(rows: Vec<M>) -> Self {
        Self {
            rows,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub async fn lookups(&self) -> Vec<(Vec<String>, Option<Vec<String>>, bool)> {
        self.lookups.lock().await.clone()
    }
}

#[async_trait]
impl<M> ModelStore<M> for MemoryStore<M>
where
    M: Searchable + Clone,
{
    async fn find_by_keys(
        &self,
        keys: &[String],
        columns: Option<&[String]>,
        with_trashed: bool,
    ) -> Result<Vec<M>, SearchError> {
        self.lookups.lock().await.push((
            keys.to_vec(),
            columns.map(<[String]>::to_vec),
            with_trashed,
        ));

        Ok(self
            .rows
            .iter()
            .filter(|row| {
                row.search_key()
                    .map(|key| keys.contains(&key))
                    .unwrap_or(false)
            })
            .filter(|row| with_trashed || !row.is_trashed())
            .cloned()
            .collect())
    }
}
