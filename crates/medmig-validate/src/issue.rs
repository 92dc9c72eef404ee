//! Validation issue types.
//!
//! Each variant carries only the data its message needs. Messages are
//! category-level: missing values are counted, not located.

use std::fmt;

use serde::{Deserialize, Serialize};

/// When a check runs relative to the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Over the source rows, before transformation.
    Pre,
    /// Over the persisted collection, after the load.
    Post,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Pre => "pre-migration",
            Stage::Post => "post-migration",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Issue {
    // Schema
    /// A required source column is absent.
    MissingColumn { column: String },

    // Content
    /// Null or blank cells across the required columns.
    MissingValues { count: u64 },
    /// Age cells that are present but not integers.
    NonNumericAge { count: u64, samples: Vec<String> },
    /// Ages in a floating-point column with a fractional part.
    FractionalAge { count: u64, samples: Vec<String> },
    /// Rows repeating an earlier (name, age) pair.
    DuplicatePatients { count: u64, samples: Vec<String> },
    /// Rows sharing an identity with an earlier row but not its gender or blood type.
    IdentityCollisions { count: u64, samples: Vec<String> },

    // Post-conditions
    /// Persisted document count differs from the transformer output.
    CountMismatch { expected: usize, actual: usize },
    /// The sampled persisted document lacks a required field.
    MissingField { field: String },
    /// Nothing persisted to sample.
    NoSampleDocument,
}

impl Issue {
    pub fn stage(&self) -> Stage {
        match self {
            Issue::MissingColumn { .. }
            | Issue::MissingValues { .. }
            | Issue::NonNumericAge { .. }
            | Issue::FractionalAge { .. }
            | Issue::DuplicatePatients { .. }
            | Issue::IdentityCollisions { .. } => Stage::Pre,
            Issue::CountMismatch { .. } | Issue::MissingField { .. } | Issue::NoSampleDocument => {
                Stage::Post
            }
        }
    }

    /// Short kebab-case name of the check.
    pub fn kind(&self) -> &'static str {
        match self {
            Issue::MissingColumn { .. } => "missing-column",
            Issue::MissingValues { .. } => "missing-values",
            Issue::NonNumericAge { .. } => "non-numeric-age",
            Issue::FractionalAge { .. } => "fractional-age",
            Issue::DuplicatePatients { .. } => "duplicate-patients",
            Issue::IdentityCollisions { .. } => "identity-collisions",
            Issue::CountMismatch { .. } => "count-mismatch",
            Issue::MissingField { .. } => "missing-field",
            Issue::NoSampleDocument => "no-sample-document",
        }
    }

    /// Number of offending cells or rows, where that applies.
    pub fn count(&self) -> Option<u64> {
        match self {
            Issue::MissingValues { count }
            | Issue::NonNumericAge { count, .. }
            | Issue::FractionalAge { count, .. }
            | Issue::DuplicatePatients { count, .. }
            | Issue::IdentityCollisions { count, .. } => Some(*count),
            _ => None,
        }
    }

    pub fn samples(&self) -> &[String] {
        match self {
            Issue::NonNumericAge { samples, .. }
            | Issue::FractionalAge { samples, .. }
            | Issue::DuplicatePatients { samples, .. }
            | Issue::IdentityCollisions { samples, .. } => samples,
            _ => &[],
        }
    }

    /// The message without sample values.
    pub fn headline(&self) -> String {
        match self {
            Issue::MissingColumn { column } => format!("required column '{column}' is missing"),
            Issue::MissingValues { count } => {
                format!("{count} missing values in required columns")
            }
            Issue::NonNumericAge { count, .. } => format!("Age has {count} non-numeric values"),
            Issue::FractionalAge { count, .. } => {
                format!("Age has {count} values with a fractional part")
            }
            Issue::DuplicatePatients { count, .. } => {
                format!("{count} rows repeat an earlier (Name, Age) pair")
            }
            Issue::IdentityCollisions { count, .. } => format!(
                "{count} rows share a patient identity but differ in gender or blood type"
            ),
            Issue::CountMismatch { expected, actual } => {
                format!("expected {expected} documents, found {actual}")
            }
            Issue::MissingField { field } => {
                format!("sampled document is missing field '{field}'")
            }
            Issue::NoSampleDocument => "no document found to sample".to_string(),
        }
    }

    pub fn message(&self) -> String {
        format!("{}{}", self.headline(), sample_suffix(self.samples()))
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

fn sample_suffix(samples: &[String]) -> String {
    if samples.is_empty() {
        String::new()
    } else {
        format!(" (e.g., {})", samples.join(", "))
    }
}
