use std::path::PathBuf;

use medmig_store::LoadSummary;
use medmig_transform::DemographicConflict;
use medmig_validate::ValidationReport;

/// Everything `migrate` reports, including how far it got.
#[derive(Debug)]
pub struct MigrationResult {
    pub source: PathBuf,
    pub namespace: String,
    pub rows: usize,
    pub pre: ValidationReport,
    pub documents: usize,
    pub admissions: usize,
    pub conflicts: Vec<DemographicConflict>,
    /// `None` when the run stopped before the load.
    pub load: Option<LoadSummary>,
    pub post: Option<ValidationReport>,
    pub dry_run: bool,
}

impl MigrationResult {
    pub fn has_errors(&self) -> bool {
        !self.pre.is_valid() || self.post.as_ref().is_some_and(|post| !post.is_valid())
    }
}

/// Result of `validate`.
#[derive(Debug)]
pub struct SourceCheck {
    pub source: PathBuf,
    pub rows: usize,
    pub unrecognized_columns: Vec<String>,
    pub report: ValidationReport,
}

/// One step of the CRUD walkthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrudStep {
    pub operation: &'static str,
    pub outcome: String,
}
