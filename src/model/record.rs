//! The `Record` type: one flow node as an ordered field map.
//!
//! Field order is load-bearing: the encoded document serializes the map in
//! insertion order, and content hashes over that serialization must stay
//! stable across edits to the extracted text/script blocks. `serde_json`'s
//! `preserve_order` feature keeps the map insertion-ordered end to end.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Fields holding arbitrary multi-line text, extracted as literal blocks.
pub const TEXT_FIELDS: [&str; 2] = ["info", "template"];

/// Fields holding script-body statements, extracted as function blocks.
pub const SCRIPT_FIELDS: [&str; 3] = ["initialize", "func", "finalize"];

/// Fixed parameter names for script wrappers, extended by each declared
/// library variable in declaration order.
pub const BASE_PARAMS: [&str; 8] = [
    "node", "msg", "RED", "context", "flow", "global", "env", "util",
];

/// Transient order key embedded at write time and stripped after read.
pub const ORDER_KEY: &str = "_order";

/// One flow node as an insertion-ordered mapping from field name to value.
///
/// Required fields are `id` (stable unique key within the collection) and
/// `type` (category discriminator); everything else passes through opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Wrap an existing field map.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The underlying ordered field map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Insert or replace a field. Replacing keeps the field's position;
    /// inserting appends it.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// The record's stable unique key, if present and a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// The record's category discriminator, if present and a string.
    #[must_use]
    pub fn node_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Check the required fields. Fails with [`Error::Validation`] when
    /// `id` or `type` is missing, not a string, or empty.
    pub fn validate(&self) -> Result<()> {
        match self.id() {
            Some(id) if !id.is_empty() => {}
            _ => return Err(Error::Validation("missing required field `id`".into())),
        }
        match self.node_type() {
            Some(t) if !t.is_empty() => {}
            _ => return Err(Error::Validation("missing required field `type`".into())),
        }
        Ok(())
    }

    /// Variable names declared in `libs`, in declaration order.
    ///
    /// Duplicates are preserved; entries without a string `var` are ignored.
    #[must_use]
    pub fn lib_vars(&self) -> Vec<String> {
        self.0
            .get("libs")
            .and_then(Value::as_array)
            .map(|libs| {
                libs.iter()
                    .filter_map(|lib| lib.get("var"))
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The transient order key, if present.
    #[must_use]
    pub fn order(&self) -> Option<i64> {
        self.0.get(ORDER_KEY).and_then(Value::as_i64)
    }

    /// Set the transient order key. A new key lands at the end of the map,
    /// after all of the record's own fields.
    pub fn set_order(&mut self, order: i64) {
        self.0.insert(ORDER_KEY.to_string(), Value::from(order));
    }

    /// Remove the transient order key without disturbing the position of
    /// any other field.
    pub fn take_order(&mut self) -> Option<i64> {
        self.0.shift_remove(ORDER_KEY).and_then(|v| v.as_i64())
    }
}
