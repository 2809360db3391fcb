//! Durable mirror for the cart store.
//!
//! The store saves its user and cart after every mutation and reloads
//! them once at startup, the way a browser front-end mirrors state into
//! local storage under fixed keys.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::{CartEntry, StoredUser};

/// Errors from loading or saving a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// What gets persisted: the `user` and `cart` keys. The transient
/// `loading` flag never hits disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub user: Option<StoredUser>,
    pub cart: Vec<CartEntry>,
}

/// Persistence seam for the cart store.
pub trait StateStore {
    /// Loads the last snapshot; `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<PersistedState>, StoreError>;
    fn save(&self, state: &PersistedState) -> Result<(), StoreError>;
}

/// JSON-file-backed store, the local-storage analog.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(state)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

/// In-memory store for tests and headless use.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<PersistedState>>>,
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        Ok(self.slot.lock().expect("store lock poisoned").clone())
    }

    fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        *self.slot.lock().expect("store lock poisoned") = Some(state.clone());
        Ok(())
    }
}
