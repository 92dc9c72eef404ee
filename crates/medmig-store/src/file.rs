//! JSON collection files.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::state::CollectionState;

/// Read a collection file. A missing file is an empty collection.
pub(crate) fn load_state(path: &Path) -> Result<CollectionState> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(CollectionState::default()),
        Err(source) => {
            return Err(StoreError::Io {
                operation: "read",
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let mut state: CollectionState =
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupted {
            path: path.to_path_buf(),
            source,
        })?;
    state.reindex();
    tracing::debug!(
        path = %path.display(),
        documents = state.len(),
        "loaded collection file"
    );
    Ok(state)
}

/// Write a collection file via temp file + rename.
pub(crate) fn save_state(path: &Path, state: &CollectionState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|source| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, state)
        .map_err(|source| StoreError::Serialization { source })?;
    writer.flush().map_err(|source| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source,
    })?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|source| StoreError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source,
        })?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        documents = state.len(),
        "saved collection file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty_collection() {
        let dir = tempdir().unwrap();
        let state = load_state(&dir.path().join("absent.json")).unwrap();
        assert_eq!(state.len(), 0);
    }

    #[test]
    fn save_then_load_keeps_documents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db").join("patients.json");
        let mut state = CollectionState::default();
        let doc = match json!({"_id": "p1", "name": "Ann Lee"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        state.insert_many(vec![doc]).unwrap();

        save_state(&path, &state).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        let loaded = load_state(&path).unwrap();
        assert!(loaded.find_one(&Filter::by_id("p1")).is_some());
    }

    #[test]
    fn corrupted_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, b"{not json").unwrap();
        let err = load_state(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted { .. }));
    }
}
