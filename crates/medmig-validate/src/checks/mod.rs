//! Individual pre-migration checks over the source frame.

pub mod age;
pub mod columns;
pub mod duplicates;
pub mod missing;

use polars::prelude::DataFrame;

use medmig_model::SourceColumn;

/// Upper bound on example values carried by an issue.
pub const MAX_SAMPLES: usize = 5;

pub(crate) fn has_column(df: &DataFrame, column: SourceColumn) -> bool {
    df.column(column.header()).is_ok()
}

/// Push `sample` unless it is already listed or the list is full.
pub(crate) fn add_sample(samples: &mut Vec<String>, sample: String) {
    if samples.len() < MAX_SAMPLES && !samples.contains(&sample) {
        samples.push(sample);
    }
}
