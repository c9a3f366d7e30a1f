//! Dot-path value lookup over untyped JSON.
//!
//! Source payloads have no schema known at compile time, so lookups operate
//! directly on `serde_json::Value` trees. Paths are dot-delimited with no
//! escaping: `"address.city"` descends into `address` then `city`.

use serde_json::Value;

/// General truthiness, matching loose JavaScript semantics:
/// `null`, `false`, numeric `0`, and `""` are falsy; everything else
/// (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Resolve a dot-delimited `path` against `source`, returning `None` when
/// the value is absent.
///
/// Traversal bails out as soon as the current value is falsy — not just
/// missing or null. A legitimate `0`, `false`, or `""` sitting anywhere
/// before the final segment therefore reads as absent. That is the
/// compatibility contract with the upstream feeds and must not be
/// "corrected" to a strict existence check.
///
/// The final resolved value is returned as-is, falsy or not, and without
/// cloning: resolving a path to an intermediate object yields a reference
/// to that exact subtree.
pub fn resolve<'a>(source: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = source;
    for segment in path.split('.') {
        if !is_truthy(current) {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            // Arrays are addressable by numeric segments ("items.0.price").
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
