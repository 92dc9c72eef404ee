//! Admissions export ingestion.
//!
//! Reads the flat per-admission CSV into a Polars `DataFrame` and exposes the
//! exact header names it found. Structural checks beyond "is this a readable,
//! non-empty CSV" belong to the pre-migration validator.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use medmig_ingest::load_admissions;
//!
//! let source = load_admissions(Path::new("data/healthcare_dataset.csv"))?;
//! println!("{} rows", source.frame.height());
//! ```

mod reader;
mod error;

pub use reader::{
    LoadedSource, MAX_CSV_FILE_SIZE, SourceHeaders, check_file_size, check_file_size_with_limit,
    load_admissions, read_source_headers, validate_encoding,
};
pub use error::{IngestError, Result};
