//! Age must be an integer on every row.

use polars::prelude::{AnyValue, Column, DataFrame};

use medmig_common::{any_to_i64, any_to_string, is_blank, is_numeric_dtype};
use medmig_model::SourceColumn;

use super::add_sample;
use crate::issue::Issue;

/// Flags present Age cells that are not whole numbers.
///
/// Text cells must parse as integers. A float column passes only when every
/// value is integral, since the transformer would otherwise truncate. Blank
/// cells are left to the missing-values check.
pub fn check(df: &DataFrame) -> Option<Issue> {
    let series = df.column(SourceColumn::Age.header()).ok()?;
    let dtype = series.dtype();
    if dtype.is_float() {
        return fractional(df, series);
    }
    if is_numeric_dtype(dtype) {
        return None;
    }
    let mut count: u64 = 0;
    let mut samples = Vec::new();
    for idx in 0..df.height() {
        let value = series.get(idx).unwrap_or(AnyValue::Null);
        if is_blank(&value) {
            continue;
        }
        let display = any_to_string(value.clone());
        if any_to_i64(value).is_none() {
            count += 1;
            add_sample(&mut samples, display);
        }
    }
    (count > 0).then_some(Issue::NonNumericAge { count, samples })
}

fn fractional(df: &DataFrame, series: &Column) -> Option<Issue> {
    let mut count: u64 = 0;
    let mut samples = Vec::new();
    for idx in 0..df.height() {
        let value = series.get(idx).unwrap_or(AnyValue::Null);
        if is_blank(&value) {
            continue;
        }
        let whole = match value {
            AnyValue::Float64(v) => v.fract() == 0.0,
            AnyValue::Float32(v) => v.fract() == 0.0,
            _ => continue,
        };
        if !whole {
            count += 1;
            add_sample(&mut samples, any_to_string(value));
        }
    }
    (count > 0).then_some(Issue::FractionalAge { count, samples })
}
