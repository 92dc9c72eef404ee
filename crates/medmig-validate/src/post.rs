//! Post-migration validation against the persisted collection.

use tracing::{info, info_span, warn};

use medmig_model::REQUIRED_DOCUMENT_FIELDS;
use medmig_store::{Collection, Filter};

use crate::error::Result;
use crate::issue::{Issue, Stage};
use crate::report::ValidationReport;

/// Check the persisted count and the shape of one sampled document.
///
/// Only the first document is inspected; this is a smoke test of the shape,
/// not a scan of the collection.
pub fn validate_persisted(collection: &Collection, expected: usize) -> Result<ValidationReport> {
    let span = info_span!("post_validate", namespace = %collection.namespace(), expected);
    let _guard = span.enter();

    let mut report = ValidationReport::new(Stage::Post);
    let actual = collection.count_documents(&Filter::all())?;
    if actual != expected {
        report.push(Issue::CountMismatch { expected, actual });
    }

    match collection.find_one(&Filter::all())? {
        Some(sample) => {
            report.extend(
                REQUIRED_DOCUMENT_FIELDS
                    .iter()
                    .filter(|field| !sample.contains_key(**field))
                    .map(|field| Issue::MissingField {
                        field: (*field).to_string(),
                    }),
            );
        }
        None => report.push(Issue::NoSampleDocument),
    }

    for issue in &report.issues {
        warn!(check = issue.kind(), "post-migration check failed");
    }
    info!(actual, issues = report.issues.len(), "post-migration validation complete");
    Ok(report)
}
