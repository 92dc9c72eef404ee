//! Loading patient documents into a collection.

use std::fmt;

use serde_json::Value;
use tracing::{info, info_span};

use medmig_model::{PatientDocument, index_fields};

use crate::collection::Collection;
use crate::document::{Document, to_document};
use crate::error::Result;
use crate::filter::Filter;
use crate::index::IndexSpec;

/// How a load treats documents already in the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Delete everything, then insert. The collection is briefly empty.
    #[default]
    Replace,
    /// Replace-or-insert by `_id`, then prune documents not in the new set.
    /// Reruns over the same input leave the collection unchanged.
    Upsert,
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Replace => write!(f, "replace"),
            LoadMode::Upsert => write!(f, "upsert"),
        }
    }
}

/// Counts from one load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub mode: LoadMode,
    /// Documents written (inserted or replaced).
    pub written: usize,
    pub inserted: usize,
    pub replaced: usize,
    /// Documents removed: everything in replace mode, stale ids in upsert mode.
    pub removed: usize,
    pub indexes: Vec<String>,
}

/// Write `documents` into `collection` and declare the query indexes.
pub fn load_documents(
    collection: &Collection,
    documents: &[PatientDocument],
    mode: LoadMode,
) -> Result<LoadSummary> {
    let span = info_span!("load", namespace = %collection.namespace(), %mode);
    let _guard = span.enter();

    let docs = documents
        .iter()
        .map(to_document)
        .collect::<Result<Vec<Document>>>()?;

    let mut summary = LoadSummary {
        mode,
        ..LoadSummary::default()
    };
    match mode {
        LoadMode::Replace => {
            summary.removed = collection.delete_many(&Filter::all())?.deleted_count;
            if !docs.is_empty() {
                summary.inserted = collection.insert_many(docs)?.inserted_ids.len();
            }
        }
        LoadMode::Upsert => {
            let ids: Vec<Value> = documents
                .iter()
                .map(|doc| Value::String(doc.identity.clone()))
                .collect();
            let result = collection.upsert_many(docs)?;
            summary.inserted = result.inserted;
            summary.replaced = result.matched;
            summary.removed = collection.delete_except_ids(ids)?.deleted_count;
        }
    }
    summary.written = summary.inserted + summary.replaced;
    summary.indexes = ensure_indexes(collection)?;

    info!(
        written = summary.written,
        inserted = summary.inserted,
        replaced = summary.replaced,
        removed = summary.removed,
        "documents loaded"
    );
    Ok(summary)
}

/// Declare the patient name and admission condition indexes.
pub fn ensure_indexes(collection: &Collection) -> Result<Vec<String>> {
    [index_fields::NAME, index_fields::ADMISSION_MEDICAL_CONDITION]
        .into_iter()
        .map(|field| collection.create_index(IndexSpec::ascending(field)))
        .collect()
}
