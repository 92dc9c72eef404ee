//! Update documents (`$set` / `$unset`).

use serde_json::{Map, Value};

use medmig_model::fields;

use crate::document::{Document, value_kind};
use crate::error::{Result, StoreError};

/// Field assignments and removals applied to one matched document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    set: Vec<(String, Value)>,
    unset: Vec<String>,
}

impl Update {
    /// `{"$set": {path: value}}`.
    pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_set(path, value)
    }

    #[must_use]
    pub fn and_set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((path.into(), value.into()));
        self
    }

    #[must_use]
    pub fn and_unset(mut self, path: impl Into<String>) -> Self {
        self.unset.push(path.into());
        self
    }

    /// Parse `{"$set": {...}, "$unset": {...}}`.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(invalid("expected an object"));
        };
        if map.is_empty() {
            return Err(invalid("update has no operators"));
        }
        let mut update = Self::default();
        for (operator, argument) in map {
            let Value::Object(assignments) = argument else {
                return Err(invalid(format!("{operator} needs an object")));
            };
            match operator.as_str() {
                "$set" => update.set.extend(assignments),
                "$unset" => update.unset.extend(assignments.into_iter().map(|(path, _)| path)),
                other => return Err(invalid(format!("unknown update operator '{other}'"))),
            }
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    /// Apply to `doc` in place. Returns whether the document changed.
    ///
    /// Fails without modifying anything when a path targets `_id` or runs
    /// through a non-object value.
    pub fn apply(&self, doc: &mut Document) -> Result<bool> {
        self.check_paths()?;
        let mut staged = doc.clone();
        for (path, value) in &self.set {
            set_path(&mut staged, path, value.clone())?;
        }
        for path in &self.unset {
            unset_path(&mut staged, path);
        }
        let changed = staged != *doc;
        *doc = staged;
        Ok(changed)
    }

    /// Reject updates that touch `_id`.
    pub(crate) fn check_paths(&self) -> Result<()> {
        for path in self.set.iter().map(|(path, _)| path).chain(&self.unset) {
            if path == fields::ID || path.starts_with("_id.") {
                return Err(StoreError::ImmutableId);
            }
        }
        Ok(())
    }

    /// The update as a `$set` / `$unset` document. Empty operators are omitted.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if !self.set.is_empty() {
            let set: Map<String, Value> = self.set.iter().cloned().collect();
            map.insert("$set".to_string(), Value::Object(set));
        }
        if !self.unset.is_empty() {
            let unset: Map<String, Value> = self
                .unset
                .iter()
                .map(|path| (path.clone(), Value::String(String::new())))
                .collect();
            map.insert("$unset".to_string(), Value::Object(unset));
        }
        Value::Object(map)
    }
}

fn invalid(reason: impl Into<String>) -> StoreError {
    StoreError::InvalidUpdate {
        reason: reason.into(),
    }
}

fn set_path(doc: &mut Document, path: &str, value: Value) -> Result<()> {
    let mut segments = path.split('.').peekable();
    let mut current = doc;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return Ok(());
        }
        let child = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match child {
            Value::Object(map) => map,
            other => {
                return Err(invalid(format!(
                    "cannot set '{path}': '{segment}' is a {}",
                    value_kind(other)
                )));
            }
        };
    }
    Err(invalid("empty field path"))
}

fn unset_path(doc: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            doc.shift_remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(child)) = doc.get_mut(head) {
                unset_path(child, rest);
            }
        }
    }
}
