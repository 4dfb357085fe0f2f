//! Structured run statistics handed to external persistence/plotting.
//!
//! A record is a JSON object, conventionally with `params` and `results`
//! sections. Records from successive steps are combined with [`StatsRecord::merge`]:
//! missing keys are inserted, nested objects are merged recursively, and at a
//! leaf the value already present is kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsRecord(Map<String, Json>);

impl StatsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record with `params` and `results` sections from serializable values.
    pub fn from_sections(params: impl Serialize, results: impl Serialize) -> crate::Result<Self> {
        let mut record = Self::new();
        record.insert("params", serde_json::to_value(params)?);
        record.insert("results", serde_json::to_value(results)?);
        Ok(record)
    }

    /// Set a top-level key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Json>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Json> {
        self.0.get(key)
    }

    /// Look up `section.key`, e.g. `("results", "visited_nodes")`.
    pub fn get_in(&self, section: &str, key: &str) -> Option<&Json> {
        self.0.get(section).and_then(|s| s.get(key))
    }

    /// Mutable access to a nested object, created empty if absent.
    ///
    /// A non-object value under `name` is left untouched and `None` is returned.
    pub fn section(&mut self, name: &str) -> Option<&mut Map<String, Json>> {
        self.0
            .entry(name.to_string())
            .or_insert_with(|| Json::Object(Map::new()))
            .as_object_mut()
    }

    /// Deep-merge `other` into `self`, first writer wins at leaves.
    pub fn merge(&mut self, other: StatsRecord) -> &mut Self {
        merge_maps(&mut self.0, other.0);
        self
    }
}

fn merge_maps(original: &mut Map<String, Json>, update: Map<String, Json>) {
    for (key, value) in update {
        match original.get_mut(&key) {
            None => {
                original.insert(key, value);
            }
            Some(Json::Object(existing)) => {
                if let Json::Object(nested) = value {
                    merge_maps(existing, nested);
                }
            }
            Some(_) => {}
        }
    }
}
