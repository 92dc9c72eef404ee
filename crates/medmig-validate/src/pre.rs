//! Pre-migration validation over the loaded source frame.

use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use medmig_transform::IdentityStrategy;

use crate::checks::{age, columns, duplicates, missing};
use crate::issue::Stage;
use crate::report::ValidationReport;

/// Key the duplicate-patient check groups rows by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DuplicateKey {
    /// Any repeated (Name, Age) pair is a duplicate.
    #[default]
    NameAge,
    /// Rows grouped by the transformer's identity must agree on gender and
    /// blood type.
    Identity(IdentityStrategy),
}

#[derive(Debug, Clone, Default)]
pub struct PreValidationOptions {
    pub duplicate_key: DuplicateKey,
}

impl PreValidationOptions {
    pub fn new(duplicate_key: DuplicateKey) -> Self {
        Self { duplicate_key }
    }
}

/// Run every source check and collect the issues.
///
/// Order: required columns, missing values, numeric age, duplicates. Checks
/// that need an absent column are skipped.
pub fn validate_source(df: &DataFrame, options: &PreValidationOptions) -> ValidationReport {
    let span = info_span!("pre_validate", rows = df.height(), columns = df.width());
    let _guard = span.enter();

    let mut report = ValidationReport::new(Stage::Pre);
    report.extend(columns::check(df));
    report.extend(missing::check(df));
    report.extend(age::check(df));
    match &options.duplicate_key {
        DuplicateKey::NameAge => report.extend(duplicates::check_name_age(df)),
        DuplicateKey::Identity(strategy) => {
            report.extend(duplicates::check_identity(df, strategy));
        }
    }

    for issue in &report.issues {
        warn!(check = issue.kind(), count = issue.count(), "pre-migration check failed");
    }
    info!(issues = report.issues.len(), "pre-migration validation complete");
    report
}
