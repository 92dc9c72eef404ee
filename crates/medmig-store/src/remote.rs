//! Collections served by a MongoDB deployment.
//!
//! Documents and filters cross the wire as BSON. Results come back as
//! relaxed extended JSON, so integers and doubles read the same as they do
//! from the local backends.

use std::collections::HashSet;

use mongodb::IndexModel;
use mongodb::bson::{self, Bson};
use mongodb::options::IndexOptions;
use mongodb::sync;
use serde_json::Value;

use medmig_model::fields;

use crate::collection::{UpdateResult, UpsertManyResult};
use crate::document::{Document, id_key, require_id};
use crate::error::{Result, StoreError};
use crate::filter::Filter;
use crate::index::IndexSpec;
use crate::update::Update;

/// The index MongoDB creates on `_id` for every collection.
const DEFAULT_INDEX: &str = "_id_";

#[derive(Debug, Clone)]
pub(crate) struct RemoteCollection {
    inner: sync::Collection<bson::Document>,
}

impl RemoteCollection {
    pub(crate) fn new(inner: sync::Collection<bson::Document>) -> Self {
        Self { inner }
    }

    /// Ordered insert. Batch duplicates are caught before anything is sent.
    pub(crate) fn insert_many(&self, docs: &[Document]) -> Result<Vec<Value>> {
        let ids = batch_ids(docs)?;
        if docs.is_empty() {
            return Ok(ids);
        }
        let converted = docs.iter().map(to_bson).collect::<Result<Vec<_>>>()?;
        self.inner
            .insert_many(converted)
            .run()
            .map_err(remote("insert_many"))?;
        Ok(ids)
    }

    pub(crate) fn delete(&self, filter: &Filter, only_first: bool) -> Result<usize> {
        let query = filter_to_bson(filter)?;
        let result = if only_first {
            self.inner.delete_one(query).run().map_err(remote("delete_one"))?
        } else {
            self.inner
                .delete_many(query)
                .run()
                .map_err(remote("delete_many"))?
        };
        Ok(to_count(result.deleted_count))
    }

    pub(crate) fn delete_except(&self, ids: Vec<Value>) -> Result<usize> {
        self.delete(&Filter::not_in(fields::ID, ids), false)
    }

    pub(crate) fn replace_one(
        &self,
        filter: &Filter,
        replacement: &Document,
        upsert: bool,
    ) -> Result<UpdateResult> {
        let result = self
            .inner
            .replace_one(filter_to_bson(filter)?, to_bson(replacement)?)
            .upsert(upsert)
            .run()
            .map_err(remote("replace_one"))?;
        Ok(UpdateResult {
            matched_count: to_count(result.matched_count),
            modified_count: to_count(result.modified_count),
            upserted_id: result.upserted_id.map(Bson::into_relaxed_extjson),
        })
    }

    /// One `replace_one(upsert)` per document. Not atomic across documents.
    pub(crate) fn upsert_many(&self, docs: &[Document]) -> Result<UpsertManyResult> {
        let ids = batch_ids(docs)?;
        let mut result = UpsertManyResult::default();
        for (id, doc) in ids.into_iter().zip(docs) {
            let outcome = self.replace_one(&Filter::by_id(id), doc, true)?;
            if outcome.upserted_id.is_some() {
                result.inserted += 1;
            } else {
                result.matched += outcome.matched_count;
                result.modified += outcome.modified_count;
            }
        }
        Ok(result)
    }

    pub(crate) fn update_one(&self, filter: &Filter, update: &Update) -> Result<UpdateResult> {
        update.check_paths()?;
        if update.is_empty() {
            return Err(StoreError::InvalidUpdate {
                reason: "update has no operators".to_string(),
            });
        }
        let result = self
            .inner
            .update_one(filter_to_bson(filter)?, value_to_bson(&update.to_value())?)
            .run()
            .map_err(remote("update_one"))?;
        Ok(UpdateResult {
            matched_count: to_count(result.matched_count),
            modified_count: to_count(result.modified_count),
            upserted_id: None,
        })
    }

    pub(crate) fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        let found = self
            .inner
            .find_one(filter_to_bson(filter)?)
            .run()
            .map_err(remote("find_one"))?;
        Ok(found.map(from_bson))
    }

    pub(crate) fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        let cursor = self
            .inner
            .find(filter_to_bson(filter)?)
            .run()
            .map_err(remote("find"))?;
        cursor
            .map(|doc| doc.map(from_bson).map_err(remote("find")))
            .collect()
    }

    pub(crate) fn count(&self, filter: &Filter) -> Result<usize> {
        let total = self
            .inner
            .count_documents(filter_to_bson(filter)?)
            .run()
            .map_err(remote("count_documents"))?;
        Ok(to_count(total))
    }

    pub(crate) fn create_index(&self, spec: &IndexSpec) -> Result<String> {
        let mut keys = bson::Document::new();
        keys.insert(spec.field.clone(), 1);
        let model = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().name(spec.name.clone()).build())
            .build();
        let created = self
            .inner
            .create_index(model)
            .run()
            .map_err(remote("create_index"))?;
        Ok(created.index_name)
    }

    pub(crate) fn list_indexes(&self) -> Result<Vec<IndexSpec>> {
        let cursor = self
            .inner
            .list_indexes()
            .run()
            .map_err(remote("list_indexes"))?;
        let mut specs = Vec::new();
        for model in cursor {
            if let Some(spec) = index_spec(model.map_err(remote("list_indexes"))?) {
                specs.push(spec);
            }
        }
        Ok(specs)
    }
}

fn remote(operation: &'static str) -> impl Fn(mongodb::error::Error) -> StoreError {
    move |source| StoreError::Remote { operation, source }
}

fn to_count(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// `_id` of every document, rejecting missing and repeated ids.
fn batch_ids(docs: &[Document]) -> Result<Vec<Value>> {
    let mut seen = HashSet::with_capacity(docs.len());
    docs.iter()
        .map(|doc| {
            let id = require_id(doc)?;
            if !seen.insert(id_key(id)) {
                return Err(StoreError::DuplicateKey { id: id.to_string() });
            }
            Ok(id.clone())
        })
        .collect()
}

fn to_bson(doc: &Document) -> Result<bson::Document> {
    bson::to_document(doc).map_err(|source| StoreError::Bson { source })
}

fn value_to_bson(value: &Value) -> Result<bson::Document> {
    bson::to_document(value).map_err(|source| StoreError::Bson { source })
}

fn filter_to_bson(filter: &Filter) -> Result<bson::Document> {
    value_to_bson(&filter.to_value())
}

fn from_bson(doc: bson::Document) -> Document {
    match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Single-field indexes other than the default `_id` index.
fn index_spec(model: IndexModel) -> Option<IndexSpec> {
    let name = model.options.and_then(|options| options.name)?;
    if name == DEFAULT_INDEX {
        return None;
    }
    let field = model.keys.keys().next()?.clone();
    Some(IndexSpec { name, field })
}
