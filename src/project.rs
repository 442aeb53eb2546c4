//! JSON projection: prune a document down to a whitelist of fields.
//!
//! The projector is a pure function over a parsed document and a
//! [`PathTree`]; the input is never mutated, every projection is a fresh
//! tree. Malformed input is converted into a displayable error envelope
//! rather than surfaced as an error, so a caller feeding it arbitrary
//! text always gets valid JSON back.

use serde_json::{json, Map, Value};

use crate::paths::{PathNode, PathTree};

/// Project an object's fields through a tree.
///
/// Keys absent from the tree are dropped. `Leaf` entries keep the value
/// verbatim; `Node` entries recurse. Insertion order of the source object
/// is preserved in the output.
#[must_use]
pub fn project(tree: &PathTree, fields: &Map<String, Value>) -> Map<String, Value> {
    let mut kept = project_object(tree, fields);
    alias_full_text(&mut kept);
    kept
}

fn project_object(tree: &PathTree, fields: &Map<String, Value>) -> Map<String, Value> {
    let mut kept = Map::new();
    for (key, value) in fields {
        match tree.get(key) {
            None => {}
            Some(PathNode::Leaf) => {
                kept.insert(key.clone(), value.clone());
            }
            Some(PathNode::Node(sub)) => {
                kept.insert(key.clone(), project_value(sub, value));
            }
        }
    }
    kept
}

/// Apply a sub-tree to a kept value.
///
/// Objects recurse. Arrays filter each object element independently with
/// the same sub-tree; scalar and nested-array elements pass through
/// unfiltered (there is no field name to match them against). Scalars
/// have nothing to recurse into and are kept as-is.
fn project_value(sub: &PathTree, value: &Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(project_object(sub, fields)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(fields) => Value::Object(project_object(sub, fields)),
                    other => other.clone(),
                })
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Copy `full_text` into `text` when the latter is missing.
///
/// Twitter's extended tweets moved the body from `text` to `full_text`;
/// consumers still running on the old field get a copy as a courtesy.
/// An existing `text` field is never overwritten.
fn alias_full_text(fields: &mut Map<String, Value>) {
    if fields.contains_key("text") {
        return;
    }
    if let Some(full_text) = fields.get("full_text").cloned() {
        fields.insert("text".to_string(), full_text);
    }
}

/// Project raw JSON text through a tree, returning JSON text.
///
/// Never fails: a document that does not parse, or whose top level is
/// not an object, comes back as an [`error_envelope`] instead.
#[must_use]
pub fn project_str(tree: &PathTree, raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(fields)) => {
            let kept = Value::Object(project(tree, &fields));
            kept.to_string()
        }
        Ok(other) => error_envelope(
            "expected a JSON object at the top level",
            &format!("got {}", type_name(&other)),
        ),
        Err(e) => error_envelope(&e.to_string(), &format!("{e:?}")),
    }
}

/// Build the `{"error": ..., "stacktrace": ...}` envelope as JSON text.
///
/// The envelope is always valid JSON; the message and detail are carried
/// as string fields so multi-line text survives serialization.
#[must_use]
pub fn error_envelope(message: &str, detail: &str) -> String {
    json!({
        "error": message,
        "stacktrace": detail,
    })
    .to_string()
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
