//! Data model for the admissions migration.
//!
//! The source side is described by [`SourceColumn`], one variant per column of
//! the tabular export. The target side is [`PatientDocument`], which embeds one
//! [`AdmissionRecord`] per source row.

pub mod columns;
pub mod document;
pub mod error;
pub mod scalar;

pub use columns::{ADMISSION_COLUMNS, REQUIRED_COLUMNS, SourceColumn};
pub use document::{
    AdmissionRecord, PatientDocument, REQUIRED_DOCUMENT_FIELDS, fields, index_fields,
    total_admissions,
};
pub use error::{ModelError, Result};
pub use scalar::ScalarValue;
