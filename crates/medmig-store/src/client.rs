//! Store client and collection registry.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::collection::Collection;
use crate::error::{Result, StoreError};
use crate::file::load_state;
use crate::remote::RemoteCollection;
use crate::state::CollectionState;
use crate::uri::StoreLocation;

type SharedState = Arc<Mutex<CollectionState>>;

/// Handle to one store. Clones share the same collections.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    location: StoreLocation,
    collections: Mutex<HashMap<(String, String), SharedState>>,
    remote: Option<mongodb::sync::Client>,
}

impl Client {
    pub(crate) fn new(location: StoreLocation) -> Result<Self> {
        let remote = match &location {
            StoreLocation::Remote(uri) => Some(
                mongodb::sync::Client::with_uri_str(uri)
                    .map_err(|source| StoreError::Remote {
                        operation: "connect",
                        source,
                    })?,
            ),
            StoreLocation::Memory | StoreLocation::Directory(_) => None,
        };
        Ok(Self {
            inner: Arc::new(ClientInner {
                location,
                collections: Mutex::new(HashMap::new()),
                remote,
            }),
        })
    }

    pub fn location(&self) -> &StoreLocation {
        &self.inner.location
    }

    /// Select `database.collection`, loading it from disk on first use.
    pub fn collection(&self, database: &str, collection: &str) -> Result<Collection> {
        validate_namespace(database, collection)?;
        if let Some(remote) = &self.inner.remote {
            let handle = remote.database(database).collection(collection);
            return Ok(Collection::remote(
                database.to_string(),
                collection.to_string(),
                RemoteCollection::new(handle),
            ));
        }
        let path = self.collection_path(database, collection);
        let mut registry = self
            .inner
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let key = (database.to_string(), collection.to_string());
        let state = match registry.get(&key) {
            Some(state) => Arc::clone(state),
            None => {
                let loaded = match &path {
                    Some(path) => load_state(path)?,
                    None => CollectionState::default(),
                };
                let state = Arc::new(Mutex::new(loaded));
                registry.insert(key, Arc::clone(&state));
                state
            }
        };
        Ok(Collection::local(
            database.to_string(),
            collection.to_string(),
            state,
            path,
        ))
    }

    fn collection_path(&self, database: &str, collection: &str) -> Option<PathBuf> {
        match &self.inner.location {
            StoreLocation::Directory(root) => {
                Some(root.join(database).join(format!("{collection}.json")))
            }
            StoreLocation::Memory | StoreLocation::Remote(_) => None,
        }
    }
}

fn validate_namespace(database: &str, collection: &str) -> Result<()> {
    let valid = |name: &str| {
        let name = name.trim();
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0', '$'])
    };
    if valid(database) && valid(collection) {
        Ok(())
    } else {
        Err(StoreError::InvalidNamespace {
            database: database.to_string(),
            collection: collection.to_string(),
        })
    }
}
