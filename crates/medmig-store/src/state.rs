//! In-memory contents of one collection.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use medmig_model::fields;

use crate::collection::{UpdateResult, UpsertManyResult};
use crate::document::{Document, document_id, id_key, require_id};
use crate::error::{Result, StoreError};
use crate::filter::Filter;
use crate::index::IndexSpec;
use crate::update::Update;

/// Documents in insertion order plus declared indexes.
///
/// `_id` lookups go through a position map that is rebuilt after deletions
/// and after loading from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CollectionState {
    #[serde(default)]
    indexes: Vec<IndexSpec>,
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl CollectionState {
    /// Restore the `_id` position map; call after deserializing.
    pub(crate) fn reindex(&mut self) {
        self.positions = self
            .documents
            .iter()
            .enumerate()
            .filter_map(|(position, doc)| document_id(doc).map(|id| (id_key(id), position)))
            .collect();
    }

    pub(crate) fn len(&self) -> usize {
        self.documents.len()
    }

    pub(crate) fn indexes(&self) -> &[IndexSpec] {
        &self.indexes
    }

    fn matching_positions(&self, filter: &Filter) -> Vec<usize> {
        if let Some(id) = filter.id_equality() {
            return self.positions.get(&id_key(id)).copied().into_iter().collect();
        }
        self.documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| filter.matches(doc))
            .map(|(position, _)| position)
            .collect()
    }

    fn first_position(&self, filter: &Filter) -> Option<usize> {
        if filter.id_equality().is_some() {
            return self.matching_positions(filter).into_iter().next();
        }
        self.documents.iter().position(|doc| filter.matches(doc))
    }

    pub(crate) fn find_one(&self, filter: &Filter) -> Option<Document> {
        self.first_position(filter)
            .map(|position| self.documents[position].clone())
    }

    pub(crate) fn find(&self, filter: &Filter) -> Vec<Document> {
        self.matching_positions(filter)
            .into_iter()
            .map(|position| self.documents[position].clone())
            .collect()
    }

    pub(crate) fn count(&self, filter: &Filter) -> usize {
        if filter.is_empty() {
            return self.documents.len();
        }
        self.matching_positions(filter).len()
    }

    /// Insert all documents or none.
    pub(crate) fn insert_many(&mut self, docs: Vec<Document>) -> Result<Vec<Value>> {
        let mut batch = HashSet::with_capacity(docs.len());
        for doc in &docs {
            let id = require_id(doc)?;
            let key = id_key(id);
            if self.positions.contains_key(&key) || !batch.insert(key) {
                return Err(StoreError::DuplicateKey { id: id.to_string() });
            }
        }
        let mut inserted = Vec::with_capacity(docs.len());
        for doc in docs {
            if let Some(id) = document_id(&doc) {
                self.positions.insert(id_key(id), self.documents.len());
                inserted.push(id.clone());
            }
            self.documents.push(doc);
        }
        Ok(inserted)
    }

    pub(crate) fn delete(&mut self, filter: &Filter, only_first: bool) -> usize {
        let mut doomed = if only_first {
            self.first_position(filter).into_iter().collect()
        } else {
            self.matching_positions(filter)
        };
        if doomed.is_empty() {
            return 0;
        }
        if doomed.len() == self.documents.len() {
            self.documents.clear();
            self.positions.clear();
            return doomed.len();
        }
        doomed.sort_unstable();
        let doomed_set: HashSet<usize> = doomed.iter().copied().collect();
        let mut position = 0;
        self.documents.retain(|_| {
            let keep = !doomed_set.contains(&position);
            position += 1;
            keep
        });
        self.reindex();
        doomed.len()
    }

    /// Drop every document whose `_id` key is not in `keep`.
    pub(crate) fn retain_ids(&mut self, keep: &HashSet<String>) -> usize {
        let before = self.documents.len();
        self.documents.retain(|doc| {
            document_id(doc).is_some_and(|id| keep.contains(&id_key(id)))
        });
        let removed = before - self.documents.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    pub(crate) fn replace_one(
        &mut self,
        filter: &Filter,
        mut replacement: Document,
        upsert: bool,
    ) -> Result<UpdateResult> {
        match self.first_position(filter) {
            Some(position) => {
                let current = &self.documents[position];
                let current_id = require_id(current)?.clone();
                match document_id(&replacement) {
                    Some(id) if id_key(id) != id_key(&current_id) => {
                        return Err(StoreError::ImmutableId);
                    }
                    Some(_) => {}
                    None => {
                        replacement.insert(fields::ID.to_string(), current_id);
                    }
                }
                let modified = *current != replacement;
                self.documents[position] = replacement;
                Ok(UpdateResult {
                    matched_count: 1,
                    modified_count: usize::from(modified),
                    upserted_id: None,
                })
            }
            None if upsert => {
                if document_id(&replacement).is_none() {
                    let id = filter.id_equality().cloned().ok_or(StoreError::MissingId)?;
                    replacement.insert(fields::ID.to_string(), id);
                }
                let mut ids = self.insert_many(vec![replacement])?;
                Ok(UpdateResult {
                    matched_count: 0,
                    modified_count: 0,
                    upserted_id: ids.pop(),
                })
            }
            None => Ok(UpdateResult::default()),
        }
    }

    /// Replace-or-insert keyed by each document's `_id`. All or nothing.
    pub(crate) fn upsert_many(&mut self, docs: Vec<Document>) -> Result<UpsertManyResult> {
        let mut batch = HashSet::with_capacity(docs.len());
        for doc in &docs {
            let id = require_id(doc)?;
            if !batch.insert(id_key(id)) {
                return Err(StoreError::DuplicateKey { id: id.to_string() });
            }
        }
        let mut result = UpsertManyResult::default();
        for doc in docs {
            let key = document_id(&doc).map(id_key).unwrap_or_default();
            match self.positions.get(&key) {
                Some(&position) => {
                    if self.documents[position] != doc {
                        result.modified += 1;
                    }
                    self.documents[position] = doc;
                    result.matched += 1;
                }
                None => {
                    self.positions.insert(key, self.documents.len());
                    self.documents.push(doc);
                    result.inserted += 1;
                }
            }
        }
        Ok(result)
    }

    pub(crate) fn update_one(&mut self, filter: &Filter, update: &Update) -> Result<UpdateResult> {
        let Some(position) = self.first_position(filter) else {
            return Ok(UpdateResult::default());
        };
        let modified = update.apply(&mut self.documents[position])?;
        Ok(UpdateResult {
            matched_count: 1,
            modified_count: usize::from(modified),
            upserted_id: None,
        })
    }

    /// Returns `true` when the index was newly declared.
    pub(crate) fn create_index(&mut self, spec: IndexSpec) -> bool {
        if self.indexes.iter().any(|existing| existing.name == spec.name) {
            return false;
        }
        self.indexes.push(spec);
        true
    }
}
