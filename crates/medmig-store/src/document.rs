//! JSON documents and dotted field paths.

use serde::Serialize;
use serde_json::{Map, Value};

use medmig_model::fields;

use crate::error::{Result, StoreError};

/// A stored document: a JSON object whose `_id` is unique within its collection.
pub type Document = Map<String, Value>;

/// Serialize any value into a [`Document`].
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    let value =
        serde_json::to_value(value).map_err(|source| StoreError::Serialization { source })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotADocument {
            found: value_kind(&other),
        }),
    }
}

/// The `_id` of a document, if present.
pub fn document_id(doc: &Document) -> Option<&Value> {
    doc.get(fields::ID)
}

pub(crate) fn require_id(doc: &Document) -> Result<&Value> {
    document_id(doc).ok_or(StoreError::MissingId)
}

/// Map key for an `_id` value. Uses the JSON text so `"1"` and `1` differ.
pub(crate) fn id_key(id: &Value) -> String {
    id.to_string()
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Values reachable at a dotted `path`.
///
/// Arrays along the way are traversed element-wise, so
/// `admissions.medical_condition` yields the condition of every admission.
/// Numeric segments index into arrays. An empty result means the path is absent.
pub(crate) fn resolve_path<'a>(doc: &'a Document, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut found = Vec::new();
    if let Some(value) = doc.get(segments[0]) {
        collect(value, &segments[1..], &mut found);
    }
    found
}

fn collect<'a>(value: &'a Value, rest: &[&str], found: &mut Vec<&'a Value>) {
    let Some((segment, tail)) = rest.split_first() else {
        found.push(value);
        return;
    };
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(*segment) {
                collect(child, tail, found);
            }
        }
        Value::Array(items) => {
            if let Ok(position) = segment.parse::<usize>() {
                if let Some(item) = items.get(position) {
                    collect(item, tail, found);
                }
                return;
            }
            for item in items {
                if item.is_object() {
                    collect(item, rest, found);
                }
            }
        }
        _ => {}
    }
}

/// Equality used by filters: numbers compare by value, so `46` equals `46.0`.
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn resolves_nested_array_paths() {
        let d = doc(json!({
            "_id": "p1",
            "admissions": [
                {"medical_condition": "Cancer"},
                {"medical_condition": "Asthma"},
                {"doctor": "Lee"}
            ]
        }));
        let found = resolve_path(&d, "admissions.medical_condition");
        assert_eq!(found, vec![&json!("Cancer"), &json!("Asthma")]);
        assert_eq!(resolve_path(&d, "admissions.1.medical_condition"), vec![&json!("Asthma")]);
        assert!(resolve_path(&d, "admissions.hospital").is_empty());
        assert!(resolve_path(&d, "missing").is_empty());
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(values_equal(&json!(46), &json!(46.0)));
        assert!(!values_equal(&json!(46), &json!("46")));
    }

    #[test]
    fn to_document_rejects_scalars() {
        let err = to_document(&42).unwrap_err();
        assert!(matches!(err, StoreError::NotADocument { found: "number" }));
    }
}
