//! Typed cell access over the loaded admissions frame.

use polars::prelude::{AnyValue, Column, DataFrame};

use medmig_common::{any_to_f64, any_to_i64, any_to_string};
use medmig_model::{ScalarValue, SourceColumn};

use crate::error::{Result, TransformError};
use crate::identity::{IdentityStrategy, birth_year, synthesize_identity, synthesize_keyed_identity};

/// Read-only view of the export with per-cell coercions.
///
/// Row indexes are zero-based; errors report one-based row numbers.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionFrame<'a> {
    df: &'a DataFrame,
}

impl<'a> AdmissionFrame<'a> {
    pub fn new(df: &'a DataFrame) -> Self {
        Self { df }
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    fn named_column(&self, name: &str) -> Result<&'a Column> {
        self.df
            .column(name)
            .map_err(|_| TransformError::MissingColumn {
                column: name.to_string(),
            })
    }

    fn cell(&self, name: &str, idx: usize) -> Result<AnyValue<'a>> {
        let column = self.named_column(name)?;
        Ok(column.get(idx)?)
    }

    pub fn value(&self, column: SourceColumn, idx: usize) -> Result<AnyValue<'a>> {
        self.cell(column.header(), idx)
    }

    pub fn text(&self, column: SourceColumn, idx: usize) -> Result<String> {
        Ok(any_to_string(self.value(column, idx)?))
    }

    /// Age as an integer; non-numeric or missing values abort.
    pub fn age(&self, idx: usize) -> Result<i64> {
        let value = self.value(SourceColumn::Age, idx)?;
        let display = any_to_string(value.clone());
        any_to_i64(value).ok_or(TransformError::Coercion {
            row: idx + 1,
            column: SourceColumn::Age.header(),
            value: display,
            target: "integer",
        })
    }

    /// Billing amount as a float; non-numeric or missing values abort.
    pub fn billing_amount(&self, idx: usize) -> Result<f64> {
        let value = self.value(SourceColumn::BillingAmount, idx)?;
        let display = any_to_string(value.clone());
        any_to_f64(value).ok_or(TransformError::Coercion {
            row: idx + 1,
            column: SourceColumn::BillingAmount.header(),
            value: display,
            target: "float",
        })
    }

    /// Cell kept in the scalar form the export provided.
    pub fn scalar(&self, column: SourceColumn, idx: usize) -> Result<ScalarValue> {
        Ok(to_scalar(self.value(column, idx)?))
    }

    /// Grouping identity for one row under `strategy`.
    pub fn identity(&self, idx: usize, strategy: &IdentityStrategy) -> Result<String> {
        let name = self.text(SourceColumn::Name, idx)?;
        match strategy {
            IdentityStrategy::AgeAnchored { reference_year } => {
                let age = self.age(idx)?;
                Ok(synthesize_identity(
                    &name,
                    Some(birth_year(*reference_year, age)),
                ))
            }
            IdentityStrategy::SourceKey { column } => {
                let key = any_to_string(self.cell(column, idx)?);
                Ok(synthesize_keyed_identity(&name, &key))
            }
        }
    }
}

fn to_scalar(value: AnyValue<'_>) -> ScalarValue {
    match value {
        AnyValue::Null => ScalarValue::Null,
        AnyValue::Int8(v) => ScalarValue::Integer(i64::from(v)),
        AnyValue::Int16(v) => ScalarValue::Integer(i64::from(v)),
        AnyValue::Int32(v) => ScalarValue::Integer(i64::from(v)),
        AnyValue::Int64(v) => ScalarValue::Integer(v),
        AnyValue::UInt8(v) => ScalarValue::Integer(i64::from(v)),
        AnyValue::UInt16(v) => ScalarValue::Integer(i64::from(v)),
        AnyValue::UInt32(v) => ScalarValue::Integer(i64::from(v)),
        AnyValue::UInt64(v) => match i64::try_from(v) {
            Ok(v) => ScalarValue::Integer(v),
            Err(_) => ScalarValue::Text(v.to_string()),
        },
        AnyValue::Float32(v) if v.is_nan() => ScalarValue::Null,
        AnyValue::Float64(v) if v.is_nan() => ScalarValue::Null,
        AnyValue::Float32(v) => ScalarValue::Float(f64::from(v)),
        AnyValue::Float64(v) => ScalarValue::Float(v),
        other => ScalarValue::Text(any_to_string(other)),
    }
}
