//! Dot-notation expansion and flattening.
//!
//! A flat key such as `Filter.1.Value.2` addresses a nested structure. Named
//! segments build mappings; numeric segments (below the top level) build
//! sequences. Sequence indices are 1-based and must be contiguous, which is
//! what legacy indexed parameters use and what keeps [`expand`] and
//! [`flatten`] exact inverses of each other.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::CoercionError;

/// How sequences are spelled when flattening back to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// `Name.1`, `Name.2` (legacy query services, dot-notation input)
    Indexed,
    /// `Name.member.1`, `Name.member.2` (modern query protocol)
    Member,
}

#[derive(Debug)]
enum Node {
    Leaf(Value),
    Map(BTreeMap<String, Node>),
    Seq(BTreeMap<usize, Node>),
}

/// Expand `(dot.key, value)` pairs into a nested JSON object.
///
/// Pairs are applied in order; a later pair with the same full key replaces
/// the earlier one.
pub fn expand<I, K>(pairs: I) -> Result<Value, CoercionError>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    let mut latest: BTreeMap<String, Value> = BTreeMap::new();
    for (key, value) in pairs {
        latest.insert(key.into(), value);
    }

    let mut root = Node::Map(BTreeMap::new());
    for (key, value) in latest {
        let segments: Vec<&str> = key.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(CoercionError::EmptySegment { key: key.clone() });
        }
        insert(&mut root, &segments, 0, value)?;
    }

    into_value(root, "")
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn parse_index(segments: &[&str], depth: usize) -> Result<usize, CoercionError> {
    let segment = segments[depth];
    if segment.len() > 1 && segment.starts_with('0') {
        return Err(CoercionError::InvalidIndex {
            path: segments[..=depth].join("."),
        });
    }
    segment.parse::<usize>().map_err(|_| CoercionError::InvalidIndex {
        path: segments[..=depth].join("."),
    })
}

fn fresh_child(segments: &[&str], depth: usize, value: &mut Option<Value>) -> Node {
    if depth + 1 == segments.len() {
        Node::Leaf(value.take().unwrap_or(Value::Null))
    } else if is_index(segments[depth + 1]) {
        Node::Seq(BTreeMap::new())
    } else {
        Node::Map(BTreeMap::new())
    }
}

fn insert(
    node: &mut Node,
    segments: &[&str],
    depth: usize,
    value: Value,
) -> Result<(), CoercionError> {
    let conflict = || CoercionError::Conflict {
        path: segments[..=depth].join("."),
    };
    let last = depth + 1 == segments.len();
    let mut value = Some(value);

    let child = match node {
        Node::Leaf(_) => return Err(conflict()),
        Node::Map(children) => {
            // Below the top level a numeric segment must address a sequence.
            if depth > 0 && is_index(segments[depth]) {
                return Err(conflict());
            }
            if children.contains_key(segments[depth]) {
                children.get_mut(segments[depth]).ok_or_else(conflict)?
            } else {
                let fresh = fresh_child(segments, depth, &mut value);
                children.entry(segments[depth].to_string()).or_insert(fresh)
            }
        }
        Node::Seq(items) => {
            if !is_index(segments[depth]) {
                return Err(conflict());
            }
            let index = parse_index(segments, depth)?;
            if items.contains_key(&index) {
                items.get_mut(&index).ok_or_else(conflict)?
            } else {
                let fresh = fresh_child(segments, depth, &mut value);
                items.entry(index).or_insert(fresh)
            }
        }
    };

    match value {
        // Freshly created leaf already holds the value.
        None => Ok(()),
        Some(value) => {
            if last || matches!(child, Node::Leaf(_)) {
                // Existing node addressed again as a leaf, or a leaf extended as a container.
                return Err(CoercionError::Conflict {
                    path: segments[..=depth].join("."),
                });
            }
            insert(child, segments, depth + 1, value)
        }
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

fn into_value(node: Node, path: &str) -> Result<Value, CoercionError> {
    match node {
        Node::Leaf(value) => Ok(value),
        Node::Map(children) => {
            let mut map = Map::new();
            for (key, child) in children {
                let child_path = join(path, &key);
                map.insert(key, into_value(child, &child_path)?);
            }
            Ok(Value::Object(map))
        }
        Node::Seq(items) => {
            let contiguous = items.keys().enumerate().all(|(i, index)| *index == i + 1);
            if !contiguous {
                return Err(CoercionError::SparseIndex {
                    path: path.to_string(),
                    indices: items.keys().copied().collect(),
                });
            }
            let mut values = Vec::with_capacity(items.len());
            for (index, child) in items {
                values.push(into_value(child, &join(path, &index.to_string()))?);
            }
            Ok(Value::Array(values))
        }
    }
}

/// Flatten a nested value back into `(dot.key, scalar)` pairs.
///
/// Empty mappings and sequences produce no keys.
pub fn flatten(value: &Value, style: ListStyle) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into(value, "", style, &mut out);
    out
}

fn flatten_into(value: &Value, prefix: &str, style: ListStyle, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child, &join(prefix, key), style, out);
            }
        }
        Value::Array(items) => {
            let base = match style {
                ListStyle::Indexed => prefix.to_string(),
                ListStyle::Member => join(prefix, "member"),
            };
            for (i, child) in items.iter().enumerate() {
                flatten_into(child, &join(&base, &(i + 1).to_string()), style, out);
            }
        }
        scalar => out.push((prefix.to_string(), scalar.clone())),
    }
}

/// Render a scalar the way query strings carry it.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
