//! Declarative field mapping: target path → source path.
//!
//! A [`MappingSchema`] normalizes one raw source item into the uniform
//! internal shape by resolving each source path ([`crate::paths::resolve`])
//! and merging the value at the target path ([`crate::record::merge`]).
//! Applying a schema never fails: absent source fields are simply omitted.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::paths::resolve;
use crate::record::merge;

/// Per-source field-mapping schema.
///
/// Keys are dot-delimited target paths, values are dot-delimited source
/// paths. Insertion order is preserved (stored as JSONB object order) and
/// is the order entries are applied in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingSchema(pub IndexMap<String, String>);

impl MappingSchema {
    /// Parse a schema from a stored JSON value (an object of strings).
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Normalize one raw item into the shape implied by the target paths.
    ///
    /// No type coercion and no validation: whether the output matches any
    /// expected record type only surfaces downstream at persist time.
    pub fn apply(&self, raw: &Value) -> Value {
        let mut out = Value::Object(Map::new());
        for (target_path, source_path) in &self.0 {
            let resolved = resolve(raw, source_path).cloned();
            merge(&mut out, target_path, resolved);
        }
        out
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MappingSchema {
    fn from(entries: [(&str, &str); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(t, s)| (t.to_string(), s.to_string()))
                .collect(),
        )
    }
}
