//! Payloads with protected routing keys.

use serde_json::Value;
use tracing::warn;

use crate::errors::SearchError;
use crate::interfaces::Searchable;
use crate::payloads::RawPayload;

/// A request payload whose routing keys can only be set on construction.
///
/// `index` is fixed by [`Payload::index`], `type` additionally by
/// [`Payload::typed`] and `id` by [`Payload::document`]. Generic writes whose
/// first path segment is one of these keys are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    raw: RawPayload,
    protected_keys: Vec<&'static str>,
}

impl Payload {
    /// Payload addressed to an index.
    pub fn index(index: &str) -> Self {
        let mut raw = RawPayload::new();
        raw.set("index", index);
        Self {
            raw,
            protected_keys: vec!["index"],
        }
    }

    /// Payload addressed to the documents of model type `M`.
    pub fn typed<M: Searchable>(index: &str) -> Self {
        let mut payload = Self::index(index);
        payload.raw.set("type", M::searchable_as());
        payload.protected_keys.push("type");
        payload
    }

    /// Payload addressed to a single model's document.
    ///
    /// Fails when the model has no key.
    pub fn document<M: Searchable>(model: &M, index: &str) -> Result<Self, SearchError> {
        let key = model
            .search_key()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SearchError::missing_key(M::searchable_as()))?;

        let mut payload = Self::typed::<M>(index);
        payload.raw.set("id", key);
        payload.protected_keys.push("id");
        Ok(payload)
    }

    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        if self.guard(path) {
            self.raw.set(path, value);
        }
        self
    }

    pub fn set_if_not_empty(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        if self.guard(path) {
            self.raw.set_if_not_empty(path, value);
        }
        self
    }

    pub fn set_if_not_null(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        if self.guard(path) {
            self.raw.set_if_not_null(path, value);
        }
        self
    }

    pub fn add(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        if self.guard(path) {
            self.raw.add(path, value);
        }
        self
    }

    pub fn add_if_not_empty(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        if self.guard(path) {
            self.raw.add_if_not_empty(path, value);
        }
        self
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.raw.get(path)
    }

    pub fn has(&self, path: &str) -> bool {
        self.raw.has(path)
    }

    pub fn is_protected(&self, path: &str) -> bool {
        let head = path.split('.').next().unwrap_or(path);
        self.protected_keys.iter().any(|key| *key == head)
    }

    pub fn into_value(self) -> Value {
        self.raw.into_value()
    }

    /// `true` when `path` may be written.
    fn guard(&self, path: &str) -> bool {
        if self.is_protected(path) {
            warn!(path = %path, "Ignoring write to protected payload key");
            return false;
        }
        true
    }
}
