//! Document store for migrated patient documents.
//!
//! A [`Client`] is obtained from a connection URI:
//!
//! - `memory://` keeps every collection in process memory.
//! - `file://<dir>` keeps each collection as `<dir>/<database>/<collection>.json`,
//!   rewritten atomically after every mutation.
//! - `mongodb://...` or `mongodb+srv://...` talks to a MongoDB deployment
//!   through the official driver.
//!
//! [`Collection`] exposes the document operations the migration needs
//! (bulk delete and insert, single-document reads and writes, counts and
//! index declarations) with MongoDB-style filters and updates.

pub mod client;
pub mod collection;
pub mod document;
pub mod error;
pub mod filter;
mod file;
pub mod index;
mod remote;
pub mod sink;
mod state;
pub mod update;
pub mod uri;

pub use client::Client;
pub use collection::{Collection, DeleteResult, InsertManyResult, UpdateResult, UpsertManyResult};
pub use document::{Document, document_id, to_document};
pub use error::{Result, StoreError};
pub use filter::Filter;
pub use index::IndexSpec;
pub use sink::{LoadMode, LoadSummary, ensure_indexes, load_documents};
pub use update::Update;
pub use uri::{StoreLocation, connect, describe, parse_uri};
