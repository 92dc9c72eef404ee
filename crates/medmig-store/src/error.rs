//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the store client and collections.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The connection URI names a scheme this store cannot serve.
    #[error("unsupported store URI scheme '{scheme}' (expected memory://, file:// or mongodb://)")]
    UnsupportedScheme { scheme: String },

    /// The connection URI could not be parsed.
    #[error("invalid store URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: &'static str },

    /// Database or collection name is empty or contains a path separator.
    #[error("invalid namespace '{database}.{collection}'")]
    InvalidNamespace {
        database: String,
        collection: String,
    },

    /// Document has no `_id` field.
    #[error("document is missing the _id field")]
    MissingId,

    /// A document with the same `_id` already exists.
    #[error("duplicate key: _id {id} already exists")]
    DuplicateKey { id: String },

    /// Value is not a JSON object.
    #[error("expected a document (JSON object), found {found}")]
    NotADocument { found: &'static str },

    /// Malformed filter.
    #[error("invalid filter: {reason}")]
    InvalidFilter { reason: String },

    /// Malformed update.
    #[error("invalid update: {reason}")]
    InvalidUpdate { reason: String },

    /// An update attempted to change or remove `_id`.
    #[error("the _id field is immutable")]
    ImmutableId,

    /// File I/O error.
    #[error("failed to {operation} store file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Temp file could not be renamed over the collection file.
    #[error("failed to complete write of {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document (de)serialization failed.
    #[error("failed to serialize document")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// A MongoDB server rejected or failed an operation.
    #[error("mongodb {operation} failed")]
    Remote {
        operation: &'static str,
        #[source]
        source: mongodb::error::Error,
    },

    /// A document could not be converted to BSON for the server.
    #[error("failed to convert document to BSON")]
    Bson {
        #[source]
        source: mongodb::bson::ser::Error,
    },

    /// A collection file exists but does not parse.
    #[error("collection file {path} is corrupted")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
