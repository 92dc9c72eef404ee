//! CSV reading for the admissions export.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use tracing::{debug, info};

use medmig_model::SourceColumn;

use crate::error::{IngestError, Result};

/// Maximum file size for CSV loading (500 MB).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Header names exactly as they appear in the first row of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHeaders {
    pub columns: Vec<String>,
}

impl SourceHeaders {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn contains(&self, column: SourceColumn) -> bool {
        self.columns.iter().any(|name| name == column.header())
    }

    /// Columns from `expected` that are absent, in the order given.
    pub fn missing(&self, expected: &[SourceColumn]) -> Vec<SourceColumn> {
        expected
            .iter()
            .filter(|column| !self.contains(**column))
            .copied()
            .collect()
    }

    /// Header names that do not belong to the admissions schema.
    pub fn unrecognized(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|name| name.parse::<SourceColumn>().is_err())
            .map(String::as_str)
            .collect()
    }
}

/// A loaded export: the frame plus the headers it was read with.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub headers: SourceHeaders,
    pub frame: DataFrame,
}

fn open_error(path: &Path, error: std::io::Error) -> IngestError {
    if error.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_CSV_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| open_error(path, e))?;
    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    Ok(())
}

/// Reject UTF-16 files; a UTF-8 BOM is accepted.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut buffer = [0u8; 4];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read >= 2 {
        if buffer[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

/// Read only the header row.
pub fn read_source_headers(path: &Path) -> Result<SourceHeaders> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| IngestError::HeaderParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let record = reader.headers().map_err(|e| IngestError::HeaderParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let columns = record
        .iter()
        .map(|raw| raw.trim_matches('\u{feff}').to_string())
        .collect();
    Ok(SourceHeaders::new(columns))
}

fn validate_frame_shape(df: &DataFrame, path: &Path) -> Result<()> {
    if df.height() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    for name in df.get_column_names() {
        if name.trim().is_empty() {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Load the admissions export into a `DataFrame`.
///
/// Schema inference scans the whole file, so a single non-numeric value far
/// down the Age column still makes the column textual.
pub fn load_admissions(path: &Path) -> Result<LoadedSource> {
    check_file_size(path)?;
    validate_encoding(path)?;
    let headers = read_source_headers(path)?;

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    validate_frame_shape(&frame, path)?;

    let unrecognized = headers.unrecognized();
    if !unrecognized.is_empty() {
        debug!(
            path = %path.display(),
            columns = ?unrecognized,
            "ignoring columns outside the admissions schema"
        );
    }
    info!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "loaded admissions export"
    );

    Ok(LoadedSource {
        path: path.to_path_buf(),
        headers,
        frame,
    })
}
