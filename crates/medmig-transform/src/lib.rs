//! Row-to-document transformation.
//!
//! Every source row is one admission. Rows are grouped into patient documents
//! keyed by a synthesized identity (see [`identity`]), in first-occurrence
//! order, with admissions kept in source row order.

pub mod error;
pub mod frame;
pub mod identity;
pub mod options;
pub mod transformer;

pub use error::{Result, TransformError};
pub use frame::AdmissionFrame;
pub use identity::{
    IdentityStrategy, birth_year, normalize_name, synthesize_identity, synthesize_keyed_identity,
};
pub use options::{ConflictPolicy, TransformOptions};
pub use transformer::{DemographicConflict, TransformOutcome, transform};
