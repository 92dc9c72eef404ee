//! Missing values in required columns.

use polars::prelude::{AnyValue, DataFrame};

use medmig_common::is_blank;
use medmig_model::REQUIRED_COLUMNS;

use crate::issue::Issue;

/// Counts null or blank cells across every present required column.
pub fn check(df: &DataFrame) -> Option<Issue> {
    let mut count: u64 = 0;
    for column in REQUIRED_COLUMNS {
        let Ok(series) = df.column(column.header()) else {
            continue;
        };
        for idx in 0..df.height() {
            let value = series.get(idx).unwrap_or(AnyValue::Null);
            if is_blank(&value) {
                count += 1;
            }
        }
    }
    (count > 0).then_some(Issue::MissingValues { count })
}
