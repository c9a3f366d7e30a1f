//! Nested-record construction.
//!
//! [`merge`] grafts one resolved value into a partially built output object
//! at the position named by a dot-delimited target path. Repeated calls with
//! paths that share a prefix accumulate into a single merged tree.

use serde_json::{Map, Value};

use crate::paths::is_truthy;

/// Merge `value` into `target` at the nested position named by `target_path`.
///
/// A single-branch object matching the path is built first, then grafted
/// onto `target` segment by segment: a segment whose existing entry is
/// missing *or falsy* adopts the fresh branch; a truthy entry is left
/// untouched and descended into. Consequently a leaf already holding a
/// truthy value is never overwritten, while a leaf holding `0`, `""`,
/// `false`, or `null` is — "already present" is decided by truthiness,
/// mirroring the resolver's absence rule.
///
/// `value` of `None` (the resolved source field was absent) still creates
/// the intermediate objects along the path; only the leaf itself is
/// omitted. Descending into a truthy non-object leaves the remaining
/// segments unapplied.
///
/// Segments may be any string; there is no escaping for literal dots and
/// no path validation.
pub fn merge(target: &mut Value, target_path: &str, value: Option<Value>) {
    let segments: Vec<&str> = target_path.split('.').collect();
    let branch = build_branch(&segments, value);
    graft(target, &segments, branch);
}

/// Build the single-branch nested object for `segments` with `value` at the
/// deepest leaf. An absent value leaves the leaf key out entirely, so
/// `["a", "b"]` yields `{"a": {"b": {}}}` minus the leaf: `{"a": {}}` at
/// the innermost level.
fn build_branch(segments: &[&str], value: Option<Value>) -> Value {
    let Some((leaf, rest)) = segments.split_last() else {
        return Value::Object(Map::new());
    };

    let mut inner = Map::new();
    if let Some(v) = value {
        inner.insert((*leaf).to_string(), v);
    }
    let mut node = Value::Object(inner);

    for key in rest.iter().rev() {
        let mut outer = Map::new();
        outer.insert((*key).to_string(), node);
        node = Value::Object(outer);
    }
    node
}

/// Walk `target` along `segments`, adopting subtrees of `branch` wherever
/// the existing entry is missing or falsy.
fn graft(target: &mut Value, segments: &[&str], mut branch: Value) {
    let mut current = target;
    for key in segments {
        let Value::Object(map) = current else {
            // Truthy scalar in the way: nothing to assign into.
            return;
        };

        let subtree = match &mut branch {
            Value::Object(bmap) => bmap.remove(*key),
            _ => None,
        };

        let existing_truthy = map.get(*key).map(is_truthy).unwrap_or(false);
        if existing_truthy {
            current = map.get_mut(*key).expect("key checked above");
            branch = subtree.unwrap_or(Value::Null);
            continue;
        }

        match subtree {
            Some(sub) => {
                map.insert((*key).to_string(), sub);
            }
            // Absent leaf over a falsy entry: the upstream contract
            // serializes this as "no key at all".
            None => {
                map.remove(*key);
            }
        }
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty() -> Value {
        json!({})
    }

    #[test]
    fn test_merge_single_segment() {
        let mut target = empty();
        merge(&mut target, "city", Some(json!("Berlin")));
        assert_eq!(target, json!({ "city": "Berlin" }));
    }

    #[test]
    fn test_merge_nested_path() {
        let mut target = empty();
        merge(&mut target, "user.name", Some(json!("Ada")));
        assert_eq!(target, json!({ "user": { "name": "Ada" } }));
    }

    #[test]
    fn test_merge_shared_prefix_accumulates() {
        let mut target = empty();
        merge(&mut target, "user.id", Some(json!(7)));
        merge(&mut target, "user.name", Some(json!("Ada")));
        assert_eq!(target, json!({ "user": { "id": 7, "name": "Ada" } }));
    }

    #[test]
    fn test_merge_truthy_leaf_is_idempotent() {
        let mut target = empty();
        merge(&mut target, "a.b", Some(json!(5)));
        merge(&mut target, "a.b", Some(json!(5)));
        assert_eq!(target, json!({ "a": { "b": 5 } }));

        // Second call with a different value is also a no-op for a truthy leaf.
        merge(&mut target, "a.b", Some(json!(9)));
        assert_eq!(target, json!({ "a": { "b": 5 } }));
    }

    #[test]
    fn test_merge_falsy_leaf_is_overwritten() {
        let mut target = empty();
        merge(&mut target, "a.b", Some(json!(0)));
        assert_eq!(target, json!({ "a": { "b": 0 } }));
        merge(&mut target, "a.b", Some(json!(5)));
        assert_eq!(target, json!({ "a": { "b": 5 } }));
    }

    #[test]
    fn test_merge_deep_paths_disjoint() {
        let mut target = empty();
        merge(&mut target, "loc.address.city", Some(json!("Köln")));
        merge(&mut target, "loc.address.zip", Some(json!("50667")));
        merge(&mut target, "loc.country", Some(json!("DE")));
        assert_eq!(
            target,
            json!({
                "loc": {
                    "address": { "city": "Köln", "zip": "50667" },
                    "country": "DE"
                }
            })
        );
    }

    #[test]
    fn test_merge_absent_value_creates_intermediates_only() {
        let mut target = empty();
        merge(&mut target, "user.name", None);
        assert_eq!(target, json!({ "user": {} }));
    }

    #[test]
    fn test_merge_absent_value_clears_falsy_leaf() {
        let mut target = empty();
        merge(&mut target, "a.b", Some(json!(0)));
        merge(&mut target, "a.b", None);
        assert_eq!(target, json!({ "a": {} }));
    }

    #[test]
    fn test_merge_absent_value_keeps_truthy_leaf() {
        let mut target = empty();
        merge(&mut target, "a.b", Some(json!(5)));
        merge(&mut target, "a.b", None);
        assert_eq!(target, json!({ "a": { "b": 5 } }));
    }

    #[test]
    fn test_merge_truthy_scalar_blocks_descent() {
        let mut target = json!({ "a": 5 });
        merge(&mut target, "a.b", Some(json!(1)));
        assert_eq!(target, json!({ "a": 5 }));
    }

    #[test]
    fn test_merge_falsy_intermediate_is_replaced() {
        let mut target = json!({ "a": 0 });
        merge(&mut target, "a.b", Some(json!(1)));
        assert_eq!(target, json!({ "a": { "b": 1 } }));
    }
}
