//! RDF mapping document normalization
//!
//! The same semantic mapping (an RDF schema: base URI, prefixes, root nodes)
//! shows up in three structurally different JSON shapes depending on where it
//! was obtained:
//!
//! 1. bare: the mapping body itself (also the canonical form);
//! 2. project-model wrapper: `{"overlayModels": {"rdfSchema": <body>}}`,
//!    as embedded in a get-models response;
//! 3. operations-history wrapper: an array of history entries
//!    `[{"operation": {"op": "rdf-extension/save-rdf-schema", "schema":
//!    <body>}}]`, a single such entry, or the inner operation object itself.
//!
//! Shapes carry no discriminator tag, so they are detected by structural
//! probing in a fixed priority order (see [`for_rdf_export`]). Both entry
//! points share that detection and then re-target the body at their
//! endpoint: RDF export wants the bare body in its `mapping` field, while
//! apply-operations wants the single-entry save-schema operations array in
//! its `operations` field. Normalization preserves the mapping content and
//! is idempotent. A body that itself used one of the wrapper keys would be
//! indistinguishable from a wrapper; such bodies do not occur in the schema
//! vocabulary.
//!
//! The two also differ in how they treat "no mapping": RDF export omits the
//! parameter entirely (`None`), while apply-operations sends the input
//! through as-is. That asymmetry is observed server behavior, deliberately
//! preserved.

use serde_json::{json, Map, Value};
use thiserror::Error;

const OVERLAY_MODELS_KEY: &str = "overlayModels";
const SCHEMA_MODEL_KEY: &str = "rdfSchema";
const OPERATION_KEY: &str = "operation";
const OP_KEY: &str = "op";
const SCHEMA_FIELD_KEY: &str = "schema";

/// Operation name under which the server records a saved mapping.
pub const SAVE_SCHEMA_OP: &str = "rdf-extension/save-rdf-schema";

/// Failure to normalize a mapping document.
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("mapping is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed mapping structure: {context}")]
    Malformed { context: String },
}

fn malformed(context: impl Into<String>) -> MappingError {
    MappingError::Malformed {
        context: context.into(),
    }
}

/// Normalize a mapping for the RDF export endpoint.
///
/// Accepts any of the three known shapes (or an already-canonical body) and
/// returns the canonical body as JSON text. "No mapping" is absence: `None`
/// input, blank input, and anything that normalizes to an empty body all
/// come out as `None`, so the caller omits the parameter.
///
/// Detection priority, tried in order: array → history entries; object with
/// `overlayModels` → project-model wrapper; object with `operation` or `op`
/// → single history entry; any other object → bare body.
pub fn for_rdf_export(mapping: Option<&str>) -> Result<Option<String>, MappingError> {
    let text = match mapping {
        None => return Ok(None),
        Some(text) => text,
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    let document: Value = serde_json::from_str(text)?;
    match normalize(&document)? {
        None => Ok(None),
        Some(body) => Ok(Some(serde_json::to_string(&body)?)),
    }
}

/// Normalize a mapping for the apply-operations endpoint.
///
/// Same shape detection as [`for_rdf_export`], but the extracted body is
/// re-wrapped into the single-entry save-schema operations array that the
/// endpoint accepts. "Nothing to normalize" is pass-through rather than
/// absence: `None` stays `None`, blank input and input without a mapping
/// body are returned unchanged (a schema-free operations history is already
/// in the endpoint's shape). Apply-operations treats "no change" as "send
/// as-is".
pub fn for_apply_operations(mapping: Option<&str>) -> Result<Option<String>, MappingError> {
    let text = match mapping {
        None => return Ok(None),
        Some(text) => text,
    };
    if text.trim().is_empty() {
        return Ok(Some(text.to_string()));
    }
    let document: Value = serde_json::from_str(text)?;
    match normalize(&document)? {
        None => Ok(Some(text.to_string())),
        Some(body) => Ok(Some(serde_json::to_string(&save_schema_entry(body))?)),
    }
}

/// The apply-operations payload that records `body` as the project's
/// mapping.
fn save_schema_entry(body: Value) -> Value {
    json!([{
        OP_KEY: SAVE_SCHEMA_OP,
        SCHEMA_FIELD_KEY: body,
        "description": "Save RDF schema",
    }])
}

/// Shared shape detection. `None` means the document carries no mapping.
fn normalize(document: &Value) -> Result<Option<Value>, MappingError> {
    match document {
        Value::Null => Ok(None),
        Value::Array(entries) => from_history_entries(entries),
        Value::Object(map) => {
            if let Some(overlays) = map.get(OVERLAY_MODELS_KEY) {
                from_project_models(overlays)
            } else if let Some(operation) = map.get(OPERATION_KEY) {
                let operation = operation.as_object().ok_or_else(|| {
                    malformed(format!("'{OPERATION_KEY}' is not an object: {operation}"))
                })?;
                schema_from_operation(operation)
            } else if map.contains_key(OP_KEY) {
                schema_from_operation(map)
            } else {
                Ok(bare_body(map))
            }
        }
        other => Err(malformed(format!(
            "expected object or array at top level, got: {other}"
        ))),
    }
}

/// Project-model wrapper: the mapping lives at `overlayModels.rdfSchema`.
/// A models document without that overlay simply has no mapping.
fn from_project_models(overlays: &Value) -> Result<Option<Value>, MappingError> {
    let overlays = overlays.as_object().ok_or_else(|| {
        malformed(format!("'{OVERLAY_MODELS_KEY}' is not an object: {overlays}"))
    })?;
    match overlays.get(SCHEMA_MODEL_KEY) {
        None => Ok(None),
        Some(schema) => {
            let body = schema.as_object().ok_or_else(|| {
                malformed(format!("'{SCHEMA_MODEL_KEY}' is not an object: {schema}"))
            })?;
            Ok(bare_body(body))
        }
    }
}

/// History listing: scan the entries and keep the LAST schema-bearing one.
/// Listings are chronological and the most recent edit is the current
/// mapping. An empty array, or entries without schemas, is "no mapping".
fn from_history_entries(entries: &[Value]) -> Result<Option<Value>, MappingError> {
    let mut found = None;
    for entry in entries {
        let entry = entry
            .as_object()
            .ok_or_else(|| malformed(format!("history entry is not an object: {entry}")))?;
        let operation = match entry.get(OPERATION_KEY) {
            Some(operation) => operation.as_object().ok_or_else(|| {
                malformed(format!("'{OPERATION_KEY}' is not an object: {operation}"))
            })?,
            None => entry,
        };
        if let Some(body) = schema_from_operation(operation)? {
            found = Some(body);
        }
    }
    Ok(found)
}

/// An operation object carries its mapping under `schema`. An operation
/// without one (a non-mapping history entry) is not an error.
fn schema_from_operation(operation: &Map<String, Value>) -> Result<Option<Value>, MappingError> {
    match operation.get(SCHEMA_FIELD_KEY) {
        None => Ok(None),
        Some(schema) => {
            let body = schema.as_object().ok_or_else(|| {
                malformed(format!("'{SCHEMA_FIELD_KEY}' is not an object: {schema}"))
            })?;
            Ok(bare_body(body))
        }
    }
}

/// The "no mapping" sentinel is absence, not an empty object.
fn bare_body(body: &Map<String, Value>) -> Option<Value> {
    if body.is_empty() {
        None
    } else {
        Some(Value::Object(body.clone()))
    }
}
