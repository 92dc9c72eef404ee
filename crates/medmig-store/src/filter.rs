//! Query filters.
//!
//! A filter is a JSON object whose keys are dotted field paths. Each value is
//! either a literal (equality) or an operator object using `$eq`, `$ne`,
//! `$in`, `$nin` or `$exists`. All conditions must hold. `{}` matches every
//! document.

use serde_json::{Value, json};

use medmig_model::fields;

use crate::document::{Document, resolve_path, value_kind, values_equal};
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq)]
enum Operator {
    Eq(Value),
    Ne(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Exists(bool),
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    path: String,
    operators: Vec<Operator>,
}

/// Parsed filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Equality on one path.
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            conditions: vec![Condition {
                path: path.into(),
                operators: vec![Operator::Eq(value.into())],
            }],
        }
    }

    /// Documents whose `_id` equals `id`.
    pub fn by_id(id: impl Into<Value>) -> Self {
        Self::eq(fields::ID, id)
    }

    /// Documents whose value at `path` is none of `values`.
    pub fn not_in(path: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            conditions: vec![Condition {
                path: path.into(),
                operators: vec![Operator::Nin(values)],
            }],
        }
    }

    /// Parse a filter document.
    ///
    /// ```
    /// use medmig_store::Filter;
    /// use serde_json::json;
    ///
    /// let filter = Filter::from_value(json!({"age": {"$in": [45, 46]}})).unwrap();
    /// assert!(!filter.is_empty());
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidFilter {
                    reason: format!("expected an object, found {}", value_kind(&other)),
                });
            }
        };
        let mut conditions = Vec::with_capacity(map.len());
        for (path, spec) in map {
            if path.is_empty() || path.starts_with('$') {
                return Err(StoreError::InvalidFilter {
                    reason: format!("unsupported field path '{path}'"),
                });
            }
            let operators = parse_operators(&path, spec)?;
            conditions.push(Condition { path, operators });
        }
        Ok(Self { conditions })
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The `_id` when this filter is a single `_id` equality.
    pub(crate) fn id_equality(&self) -> Option<&Value> {
        match self.conditions.as_slice() {
            [Condition { path, operators }] if path == fields::ID => match operators.as_slice() {
                [Operator::Eq(value)] => Some(value),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|condition| {
            let found = resolve_path(doc, &condition.path);
            condition
                .operators
                .iter()
                .all(|operator| operator_matches(operator, &found))
        })
    }

    /// The filter as a JSON document.
    pub fn to_value(&self) -> Value {
        let mut map = Document::new();
        for condition in &self.conditions {
            let spec = match condition.operators.as_slice() {
                [Operator::Eq(value)] if !is_operator_object(value) => value.clone(),
                operators => {
                    let mut ops = Document::new();
                    for operator in operators {
                        let (name, value) = match operator {
                            Operator::Eq(v) => ("$eq", v.clone()),
                            Operator::Ne(v) => ("$ne", v.clone()),
                            Operator::In(vs) => ("$in", Value::Array(vs.clone())),
                            Operator::Nin(vs) => ("$nin", Value::Array(vs.clone())),
                            Operator::Exists(b) => ("$exists", json!(b)),
                        };
                        ops.insert(name.to_string(), value);
                    }
                    Value::Object(ops)
                }
            };
            map.insert(condition.path.clone(), spec);
        }
        Value::Object(map)
    }
}

fn is_operator_map(map: &Document) -> bool {
    !map.is_empty() && map.keys().all(|key| key.starts_with('$'))
}

fn is_operator_object(value: &Value) -> bool {
    matches!(value, Value::Object(map) if is_operator_map(map))
}

fn parse_operators(path: &str, spec: Value) -> Result<Vec<Operator>> {
    let ops = match spec {
        Value::Object(map) if is_operator_map(&map) => map,
        literal => return Ok(vec![Operator::Eq(literal)]),
    };
    ops.into_iter()
        .map(|(name, argument)| match name.as_str() {
            "$eq" => Ok(Operator::Eq(argument)),
            "$ne" => Ok(Operator::Ne(argument)),
            "$in" => list_argument(path, &name, argument).map(Operator::In),
            "$nin" => list_argument(path, &name, argument).map(Operator::Nin),
            "$exists" => match argument {
                Value::Bool(flag) => Ok(Operator::Exists(flag)),
                other => Err(StoreError::InvalidFilter {
                    reason: format!(
                        "$exists on '{path}' needs a boolean, found {}",
                        value_kind(&other)
                    ),
                }),
            },
            _ => Err(StoreError::InvalidFilter {
                reason: format!("unknown operator '{name}' on '{path}'"),
            }),
        })
        .collect()
}

fn list_argument(path: &str, name: &str, argument: Value) -> Result<Vec<Value>> {
    match argument {
        Value::Array(values) => Ok(values),
        other => Err(StoreError::InvalidFilter {
            reason: format!(
                "{name} on '{path}' needs an array, found {}",
                value_kind(&other)
            ),
        }),
    }
}

/// Candidates at a path: each resolved value plus the elements of resolved arrays.
fn candidates<'a>(found: &[&'a Value]) -> Vec<&'a Value> {
    let mut out = Vec::with_capacity(found.len());
    for value in found {
        out.push(*value);
        if let Value::Array(items) = value {
            out.extend(items.iter());
        }
    }
    out
}

fn any_equal(found: &[&Value], target: &Value) -> bool {
    if found.is_empty() {
        return target.is_null();
    }
    candidates(found)
        .into_iter()
        .any(|candidate| values_equal(candidate, target))
}

fn operator_matches(operator: &Operator, found: &[&Value]) -> bool {
    match operator {
        Operator::Eq(target) => any_equal(found, target),
        Operator::Ne(target) => !any_equal(found, target),
        Operator::In(targets) => targets.iter().any(|target| any_equal(found, target)),
        Operator::Nin(targets) => !targets.iter().any(|target| any_equal(found, target)),
        Operator::Exists(expected) => found.is_empty() != *expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Document {
        match json!({
            "_id": "patient_ann_lee_2000",
            "name": "Ann Lee",
            "age": 25,
            "admissions": [
                {"medical_condition": "Asthma", "room_number": 214},
                {"medical_condition": "Obesity", "room_number": "B-12"}
            ]
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn filter(value: Value) -> Filter {
        Filter::from_value(value).unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(filter(json!({})).matches(&patient()));
        assert!(Filter::all().matches(&Document::new()));
    }

    #[test]
    fn equality_and_array_traversal() {
        let doc = patient();
        assert!(filter(json!({"name": "Ann Lee"})).matches(&doc));
        assert!(filter(json!({"admissions.medical_condition": "Obesity"})).matches(&doc));
        assert!(!filter(json!({"admissions.medical_condition": "Cancer"})).matches(&doc));
        assert!(filter(json!({"age": 25.0})).matches(&doc));
    }

    #[test]
    fn operators() {
        let doc = patient();
        assert!(filter(json!({"age": {"$ne": 30}})).matches(&doc));
        assert!(filter(json!({"age": {"$in": [24, 25]}})).matches(&doc));
        assert!(!filter(json!({"age": {"$nin": [25]}})).matches(&doc));
        assert!(filter(json!({"gender": {"$exists": false}})).matches(&doc));
        assert!(filter(json!({"admissions": {"$exists": true}})).matches(&doc));
        assert!(filter(json!({"gender": null})).matches(&doc));
    }

    #[test]
    fn rejects_unknown_operators() {
        let err = Filter::from_value(json!({"age": {"$gt": 3}})).unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilter { .. }));
        let err = Filter::from_value(json!(["age"])).unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilter { .. }));
    }

    #[test]
    fn id_equality_fast_path() {
        assert_eq!(Filter::by_id("p1").id_equality(), Some(&json!("p1")));
        assert_eq!(Filter::eq("name", "p1").id_equality(), None);
    }

    #[test]
    fn renders_back_to_json() {
        let value = json!({"_id": {"$nin": ["a", "b"]}, "name": "Ann Lee"});
        assert_eq!(filter(value.clone()).to_value(), value);
    }
}
