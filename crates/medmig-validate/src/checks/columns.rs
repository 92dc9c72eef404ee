//! Required column presence.

use polars::prelude::DataFrame;

use medmig_model::REQUIRED_COLUMNS;

use super::has_column;
use crate::issue::Issue;

/// One issue per absent required column, in the fixed required-column order.
pub fn check(df: &DataFrame) -> Vec<Issue> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|column| !has_column(df, **column))
        .map(|column| Issue::MissingColumn {
            column: column.header().to_string(),
        })
        .collect()
}
