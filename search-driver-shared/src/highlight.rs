//! Highlight fragments returned with a hit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Matched-text fragments keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Highlight {
    fragments: BTreeMap<String, Vec<String>>,
}

impl Highlight {
    /// Build from a hit's `highlight` object. Non-string fragments are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let fragments: BTreeMap<String, Vec<String>> = object
            .iter()
            .map(|(field, fragments)| {
                let texts = fragments
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|f| f.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                (field.clone(), texts)
            })
            .collect();

        if fragments.is_empty() {
            None
        } else {
            Some(Self { fragments })
        }
    }

    /// All fragments for a field.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.fragments.get(field).map(Vec::as_slice)
    }

    /// The first fragment for a field, if any.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fragments
            .get(field)
            .and_then(|f| f.first())
            .map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }
}
