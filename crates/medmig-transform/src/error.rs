//! Transformation errors.

use thiserror::Error;

/// Errors that abort a transformation pass. There is no per-row recovery.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A column the transformer reads is absent from the frame.
    #[error("column '{column}' not found in source data")]
    MissingColumn { column: String },

    /// A cell could not be converted to the numeric type the document needs.
    #[error("row {row}: cannot convert {column} value '{value}' to {target}")]
    Coercion {
        row: usize,
        column: &'static str,
        value: String,
        target: &'static str,
    },

    /// Rows sharing an identity disagree on demographics under the reject policy.
    ///
    /// The identity names the patient, so it stays out of the message.
    #[error("row {row}: {field} differs from the first row of the same patient")]
    DemographicConflict {
        row: usize,
        identity: String,
        field: &'static str,
    },

    /// Failed DataFrame access.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_message_names_row_and_column() {
        let err = TransformError::Coercion {
            row: 3,
            column: "Age",
            value: "N/A".to_string(),
            target: "integer",
        };
        assert_eq!(
            err.to_string(),
            "row 3: cannot convert Age value 'N/A' to integer"
        );
    }

    #[test]
    fn conflict_message_leaves_out_the_patient() {
        let err = TransformError::DemographicConflict {
            row: 2,
            identity: "patient_john_smith_1985".to_string(),
            field: "age",
        };
        let message = err.to_string();
        assert_eq!(
            message,
            "row 2: age differs from the first row of the same patient"
        );
        assert!(!message.contains("john_smith"));
    }
}
