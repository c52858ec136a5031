//! JSON document helpers
//!
//! Thin layer over `serde_json` used by every command parser: parse a body
//! into a document, then pull required fields out of it by path. A missing
//! field fails loudly with the path and a rendering of the document, which is
//! the single mechanism that turns "the server replied, but not in the shape
//! we expected" into a typed failure instead of a null-dereference.

use serde_json::Value;

use crate::error::{RefineError, Result};

/// Parse a response body into a JSON document.
pub fn parse(text: &str) -> Result<Value> {
    let doc: Value = serde_json::from_str(text)?;
    Ok(doc)
}

/// Look up a required field by dot-separated path (`"a.b.0.c"`).
///
/// Numeric segments index into arrays. Returns [`RefineError::MissingField`]
/// when any segment is absent or the value at a segment cannot be traversed.
pub fn find_required<'a>(document: &'a Value, path: &str) -> Result<&'a Value> {
    let mut current = document;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        };
        current = next.ok_or_else(|| missing(document, path))?;
    }
    Ok(current)
}

/// Look up a required string field by path.
///
/// A field that exists but is not a string counts as missing: the caller
/// asked for a string and the document does not have one at that path.
pub fn find_required_string(document: &Value, path: &str) -> Result<String> {
    let value = find_required(document, path)?;
    value
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| missing(document, path))
}

fn missing(document: &Value, path: &str) -> RefineError {
    RefineError::MissingField {
        path: path.to_string(),
        document: document.to_string(),
    }
}
