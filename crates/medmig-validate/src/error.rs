//! Validation errors.

use thiserror::Error;

use medmig_store::StoreError;

use crate::issue::{Issue, Stage};

#[derive(Debug, Error)]
pub enum ValidationError {
    /// At least one integrity check failed. `issue` is the first one found.
    #[error("{stage} validation failed: {issue}{}", more_suffix(.total))]
    Failed {
        stage: Stage,
        issue: Issue,
        total: usize,
    },

    /// The store could not be queried.
    #[error("could not read persisted documents")]
    Store(#[from] StoreError),
}

fn more_suffix(total: &usize) -> String {
    match *total {
        0 | 1 => String::new(),
        n => format!(" (and {} more)", n - 1),
    }
}

/// Result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_first_issue_and_remainder() {
        let err = ValidationError::Failed {
            stage: Stage::Pre,
            issue: Issue::MissingColumn {
                column: "Doctor".to_string(),
            },
            total: 3,
        };
        assert_eq!(
            err.to_string(),
            "pre-migration validation failed: required column 'Doctor' is missing (and 2 more)"
        );
    }
}
