//! Migration pipeline stages.
//!
//! `migrate` runs: load CSV, pre-validate, transform, load documents,
//! post-validate. A failing pre-validation stops the run before anything is
//! written; every other failure is returned as an error.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tracing::{debug, error, info, info_span, warn};

use medmig_ingest::{LoadedSource, load_admissions};
use medmig_model::fields;
use medmig_store::{Collection, Filter, LoadMode, Update, connect, load_documents, to_document};
use medmig_transform::{ConflictPolicy, IdentityStrategy, TransformOptions, transform};
use medmig_validate::{DuplicateKey, PreValidationOptions, validate_persisted, validate_source};

use crate::config::MigrationConfig;
use crate::logging::redact_value;
use crate::types::{CrudStep, MigrationResult, SourceCheck};

/// `_id` of the document the CRUD walkthrough creates and removes.
pub const DEMO_PATIENT_ID: &str = "patient_demo_001";

/// Behaviour switches for one `migrate` run.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub identity: IdentityStrategy,
    pub conflicts: ConflictPolicy,
    pub duplicate_key: DuplicateKey,
    pub load_mode: LoadMode,
    /// Stop after transformation.
    pub dry_run: bool,
}

impl MigrationOptions {
    /// Full-replace load, first-wins conflicts, strict (Name, Age) duplicate check.
    pub fn new(identity: IdentityStrategy) -> Self {
        Self {
            identity,
            duplicate_key: DuplicateKey::NameAge,
            conflicts: ConflictPolicy::default(),
            load_mode: LoadMode::default(),
            dry_run: false,
        }
    }
}

/// Load the export, warning about columns outside the known schema.
pub fn ingest(path: &Path) -> Result<LoadedSource> {
    let source =
        load_admissions(path).with_context(|| format!("load source {}", path.display()))?;
    let unrecognized = source.headers.unrecognized();
    if !unrecognized.is_empty() {
        warn!(columns = ?unrecognized, "source has columns outside the admissions schema");
    }
    Ok(source)
}

/// Select the configured collection.
pub fn open_collection(config: &MigrationConfig) -> Result<Collection> {
    let client = connect(&config.store_uri).context("connect to document store")?;
    client
        .collection(&config.database, &config.collection)
        .with_context(|| format!("select {}.{}", config.database, config.collection))
}

/// Pre-migration checks only.
pub fn check_source(path: &Path, options: &PreValidationOptions) -> Result<SourceCheck> {
    let source = ingest(path)?;
    let report = validate_source(&source.frame, options);
    Ok(SourceCheck {
        source: source.path.clone(),
        rows: source.frame.height(),
        unrecognized_columns: source
            .headers
            .unrecognized()
            .into_iter()
            .map(str::to_string)
            .collect(),
        report,
    })
}

pub fn migrate(config: &MigrationConfig, options: &MigrationOptions) -> Result<MigrationResult> {
    let data_file = config.data_file()?.to_path_buf();
    let namespace = format!("{}.{}", config.database, config.collection);
    let span = info_span!("migrate", %namespace, mode = %options.load_mode);
    let _guard = span.enter();

    let source = ingest(&data_file)?;
    let rows = source.frame.height();
    info!(rows, "source loaded");

    let pre = validate_source(
        &source.frame,
        &PreValidationOptions::new(options.duplicate_key.clone()),
    );
    let mut result = MigrationResult {
        source: data_file,
        namespace,
        rows,
        pre,
        documents: 0,
        admissions: 0,
        conflicts: Vec::new(),
        load: None,
        post: None,
        dry_run: options.dry_run,
    };
    if !result.pre.is_valid() {
        error!(
            issues = result.pre.issues.len(),
            "pre-migration validation failed; nothing was written"
        );
        return Ok(result);
    }

    let transform_options =
        TransformOptions::new(options.identity.clone()).with_conflict_policy(options.conflicts);
    let outcome = transform(&source.frame, &transform_options).context("transform rows")?;
    for conflict in &outcome.conflicts {
        debug!(
            row = conflict.row,
            identity = redact_value(&conflict.identity),
            field = conflict.field,
            kept = redact_value(&conflict.kept),
            ignored = redact_value(&conflict.ignored),
            "absorbed demographic conflict"
        );
    }
    result.documents = outcome.document_count();
    result.admissions = outcome.admission_count();
    result.conflicts = outcome.conflicts.clone();

    if options.dry_run {
        info!(documents = result.documents, "dry run: skipping load");
        return Ok(result);
    }

    let collection = open_collection(config)?;
    let summary = load_documents(&collection, &outcome.documents, options.load_mode)
        .context("load documents")?;
    result.load = Some(summary);

    let post = validate_persisted(&collection, outcome.document_count())
        .context("post-migration validation")?;
    if !post.is_valid() {
        error!(issues = post.issues.len(), "post-migration validation failed");
    }
    result.post = Some(post);
    Ok(result)
}

/// Insert, read, update, read and delete one demo patient.
pub fn crud_demo(collection: &Collection) -> Result<Vec<CrudStep>> {
    let span = info_span!("crud_demo", namespace = %collection.namespace());
    let _guard = span.enter();
    let by_id = Filter::by_id(DEMO_PATIENT_ID);
    let mut steps = Vec::with_capacity(5);

    let demo = to_document(&json!({
        "_id": DEMO_PATIENT_ID,
        "name": "John Doe",
        "age": 45,
        "gender": "Male",
        "admissions": [],
    }))?;
    let id = collection
        .insert_one(demo)
        .context("insert demo patient")?;
    steps.push(CrudStep {
        operation: "insert_one",
        outcome: format!("inserted {}", display_id(&id)),
    });

    steps.push(CrudStep {
        operation: "find_one",
        outcome: describe_demo(collection, &by_id)?,
    });

    let updated = collection
        .update_one(&by_id, &Update::set(fields::AGE, 46))
        .context("update demo patient")?;
    steps.push(CrudStep {
        operation: "update_one",
        outcome: format!(
            "matched {}, modified {}",
            updated.matched_count, updated.modified_count
        ),
    });

    steps.push(CrudStep {
        operation: "find_one",
        outcome: describe_demo(collection, &by_id)?,
    });

    let deleted = collection
        .delete_one(&by_id)
        .context("delete demo patient")?;
    steps.push(CrudStep {
        operation: "delete_one",
        outcome: format!("deleted {}", deleted.deleted_count),
    });

    info!(steps = steps.len(), "CRUD walkthrough complete");
    Ok(steps)
}

fn describe_demo(collection: &Collection, filter: &Filter) -> Result<String> {
    let found = collection.find_one(filter).context("read demo patient")?;
    Ok(match found {
        Some(doc) => format!(
            "{} age {}",
            doc.get(fields::NAME).and_then(Value::as_str).unwrap_or("-"),
            doc.get(fields::AGE).map_or_else(|| "-".to_string(), Value::to_string)
        ),
        None => "not found".to_string(),
    })
}

fn display_id(id: &Value) -> String {
    id.as_str().map_or_else(|| id.to_string(), str::to_string)
}
