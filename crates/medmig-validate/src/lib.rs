//! Pre- and post-migration integrity checks.
//!
//! Both validators collect every issue they find into a [`ValidationReport`];
//! [`ValidationReport::into_result`] turns a failing report into an error
//! carrying the first issue, for callers that stop the run.

pub mod checks;
pub mod error;
pub mod issue;
pub mod post;
pub mod pre;
pub mod report;

pub use error::{Result, ValidationError};
pub use issue::{Issue, Stage};
pub use post::validate_persisted;
pub use pre::{DuplicateKey, PreValidationOptions, validate_source};
pub use report::ValidationReport;
