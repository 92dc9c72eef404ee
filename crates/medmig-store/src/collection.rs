//! Collection handle and operation results.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::document::{Document, id_key};
use crate::error::{Result, StoreError};
use crate::file::save_state;
use crate::filter::Filter;
use crate::index::IndexSpec;
use crate::remote::RemoteCollection;
use crate::state::CollectionState;
use crate::update::Update;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertManyResult {
    pub inserted_ids: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteResult {
    pub deleted_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateResult {
    pub matched_count: usize,
    pub modified_count: usize,
    pub upserted_id: Option<Value>,
}

/// Outcome of [`Collection::upsert_many`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpsertManyResult {
    /// Documents whose `_id` already existed.
    pub matched: usize,
    /// Matched documents whose content changed.
    pub modified: usize,
    pub inserted: usize,
}

/// One named collection within a database.
///
/// Every local operation is atomic with respect to the collection: a failing
/// operation leaves it unchanged. File-backed collections stage each mutation
/// on a copy and only adopt it once the file has been rewritten. MongoDB
/// collections inherit the server's per-document atomicity.
#[derive(Debug, Clone)]
pub struct Collection {
    database: String,
    name: String,
    backend: Backend,
}

#[derive(Debug, Clone)]
enum Backend {
    Local(LocalCollection),
    Remote(RemoteCollection),
}

#[derive(Debug, Clone)]
struct LocalCollection {
    state: Arc<Mutex<CollectionState>>,
    path: Option<PathBuf>,
}

impl LocalCollection {
    fn lock(&self) -> MutexGuard<'_, CollectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a mutation and persist when it reports a change.
    ///
    /// With a backing file the mutation runs on a copy, so a failed save
    /// leaves the shared state as it was.
    fn write<T>(&self, op: impl FnOnce(&mut CollectionState) -> Result<(T, bool)>) -> Result<T> {
        let mut state = self.lock();
        let Some(path) = &self.path else {
            return op(&mut state).map(|(result, _)| result);
        };
        let mut staged = state.clone();
        let (result, dirty) = op(&mut staged)?;
        if dirty {
            save_state(path, &staged)?;
            *state = staged;
        }
        Ok(result)
    }
}

impl Collection {
    pub(crate) fn local(
        database: String,
        name: String,
        state: Arc<Mutex<CollectionState>>,
        path: Option<PathBuf>,
    ) -> Self {
        Self {
            database,
            name,
            backend: Backend::Local(LocalCollection { state, path }),
        }
    }

    pub(crate) fn remote(database: String, name: String, inner: RemoteCollection) -> Self {
        Self {
            database,
            name,
            backend: Backend::Remote(inner),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `database.collection`
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.name)
    }

    pub fn insert_one(&self, doc: Document) -> Result<Value> {
        let mut ids = self.insert_many(vec![doc])?.inserted_ids;
        ids.pop().ok_or(StoreError::MissingId)
    }

    /// Insert every document or none. Each needs a unique `_id`.
    pub fn insert_many(&self, docs: Vec<Document>) -> Result<InsertManyResult> {
        let requested = docs.len();
        let inserted_ids = match &self.backend {
            Backend::Local(local) => local.write(|state| {
                let ids = state.insert_many(docs)?;
                let dirty = !ids.is_empty();
                Ok((ids, dirty))
            })?,
            Backend::Remote(remote) => remote.insert_many(&docs)?,
        };
        debug!(
            namespace = %self.namespace(),
            requested,
            inserted = inserted_ids.len(),
            "insert_many"
        );
        Ok(InsertManyResult { inserted_ids })
    }

    pub fn delete_many(&self, filter: &Filter) -> Result<DeleteResult> {
        let deleted_count = self.delete(filter, false)?;
        debug!(namespace = %self.namespace(), deleted_count, "delete_many");
        Ok(DeleteResult { deleted_count })
    }

    pub fn delete_one(&self, filter: &Filter) -> Result<DeleteResult> {
        let deleted_count = self.delete(filter, true)?;
        Ok(DeleteResult { deleted_count })
    }

    fn delete(&self, filter: &Filter, only_first: bool) -> Result<usize> {
        match &self.backend {
            Backend::Local(local) => local.write(|state| {
                let deleted = state.delete(filter, only_first);
                Ok((deleted, deleted > 0))
            }),
            Backend::Remote(remote) => remote.delete(filter, only_first),
        }
    }

    /// Delete every document whose `_id` is not in `ids`.
    ///
    /// Local collections check membership through a hash set, so pruning
    /// stays linear in the collection size.
    pub fn delete_except_ids(&self, ids: Vec<Value>) -> Result<DeleteResult> {
        let deleted_count = match &self.backend {
            Backend::Local(local) => {
                let keep: HashSet<String> = ids.iter().map(id_key).collect();
                local.write(|state| {
                    let deleted = state.retain_ids(&keep);
                    Ok((deleted, deleted > 0))
                })?
            }
            Backend::Remote(remote) => remote.delete_except(ids)?,
        };
        debug!(namespace = %self.namespace(), deleted_count, "delete_except_ids");
        Ok(DeleteResult { deleted_count })
    }

    /// Replace the first match. With `upsert`, insert when nothing matches,
    /// taking `_id` from the filter if the replacement has none.
    pub fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        upsert: bool,
    ) -> Result<UpdateResult> {
        match &self.backend {
            Backend::Local(local) => local.write(|state| {
                let result = state.replace_one(filter, replacement, upsert)?;
                let dirty = result.modified_count > 0 || result.upserted_id.is_some();
                Ok((result, dirty))
            }),
            Backend::Remote(remote) => remote.replace_one(filter, &replacement, upsert),
        }
    }

    /// Batched `replace_one(upsert)` keyed by each document's `_id`.
    pub fn upsert_many(&self, docs: Vec<Document>) -> Result<UpsertManyResult> {
        let result = match &self.backend {
            Backend::Local(local) => local.write(|state| {
                let result = state.upsert_many(docs)?;
                let dirty = result.modified > 0 || result.inserted > 0;
                Ok((result, dirty))
            })?,
            Backend::Remote(remote) => remote.upsert_many(&docs)?,
        };
        debug!(
            namespace = %self.namespace(),
            matched = result.matched,
            modified = result.modified,
            inserted = result.inserted,
            "upsert_many"
        );
        Ok(result)
    }

    pub fn update_one(&self, filter: &Filter, update: &Update) -> Result<UpdateResult> {
        match &self.backend {
            Backend::Local(local) => local.write(|state| {
                let result = state.update_one(filter, update)?;
                let dirty = result.modified_count > 0;
                Ok((result, dirty))
            }),
            Backend::Remote(remote) => remote.update_one(filter, update),
        }
    }

    pub fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        match &self.backend {
            Backend::Local(local) => Ok(local.lock().find_one(filter)),
            Backend::Remote(remote) => remote.find_one(filter),
        }
    }

    /// [`find_one`](Self::find_one) deserialized into `T`.
    pub fn find_one_as<T: DeserializeOwned>(&self, filter: &Filter) -> Result<Option<T>> {
        self.find_one(filter)?
            .map(|doc| {
                serde_json::from_value(Value::Object(doc))
                    .map_err(|source| StoreError::Serialization { source })
            })
            .transpose()
    }

    /// Matches in insertion order (natural order for MongoDB).
    pub fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        match &self.backend {
            Backend::Local(local) => Ok(local.lock().find(filter)),
            Backend::Remote(remote) => remote.find(filter),
        }
    }

    pub fn count_documents(&self, filter: &Filter) -> Result<usize> {
        match &self.backend {
            Backend::Local(local) => Ok(local.lock().count(filter)),
            Backend::Remote(remote) => remote.count(filter),
        }
    }

    /// Declare an index and return its name. Existing names are left alone.
    pub fn create_index(&self, spec: IndexSpec) -> Result<String> {
        match &self.backend {
            Backend::Local(local) => {
                let name = spec.name.clone();
                let created = local.write(|state| {
                    let created = state.create_index(spec);
                    Ok((created, created))
                })?;
                debug!(namespace = %self.namespace(), index = %name, created, "create_index");
                Ok(name)
            }
            Backend::Remote(remote) => {
                let name = remote.create_index(&spec)?;
                debug!(namespace = %self.namespace(), index = %name, "create_index");
                Ok(name)
            }
        }
    }

    pub fn list_indexes(&self) -> Result<Vec<IndexSpec>> {
        match &self.backend {
            Backend::Local(local) => Ok(local.lock().indexes().to_vec()),
            Backend::Remote(remote) => remote.list_indexes(),
        }
    }
}
