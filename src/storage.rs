//! Session persistence for the CLI.
//!
//! The dish store is saved as JSON between invocations. Staged updates are
//! never written; they live only for the command that created them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

use prep_core::{DishStore, RandomIds, Session, StoreState};

const SESSION_FILENAME: &str = "session.json";
const SNAPSHOT_VERSION: u32 = 1;

/// What is written to disk.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub state: StoreState,
}

/// Loads and saves the session file in the data directory.
#[derive(Clone, Debug)]
pub struct SessionStorage {
    data_dir: PathBuf,
}

impl SessionStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILENAME)
    }

    /// Loads saved state.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(&self) -> Result<Option<StoreState>, StorageError> {
        let path = self.path();

        match fs::read(&path) {
            Ok(bytes) => {
                let snapshot: SessionSnapshot = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::LoadError(path.clone(), e.to_string()))?;
                if snapshot.version != SNAPSHOT_VERSION {
                    return Err(StorageError::LoadError(
                        path,
                        format!("unsupported session version {}", snapshot.version),
                    ));
                }
                tracing::debug!(
                    dishes = snapshot.state.dishes.len(),
                    saved_at = %snapshot.saved_at,
                    "loaded session"
                );
                Ok(Some(snapshot.state))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(path, e)),
        }
    }

    /// Opens a session from disk, or an empty one.
    pub fn open(&self) -> Result<Session, StorageError> {
        let state = self.load()?.unwrap_or_default();
        Ok(Session::with_store(DishStore::from_state(state, RandomIds)))
    }

    /// Saves state to disk, creating the data directory if needed.
    pub fn save(&self, state: &StoreState) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::IoError(self.data_dir.clone(), e))?;

        let snapshot = SessionSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            state: state.clone(),
        };
        let path = self.path();
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StorageError::LoadError(path.clone(), e.to_string()))?;

        fs::write(&path, json).map_err(|e| StorageError::IoError(path, e))?;
        tracing::debug!(dishes = state.dishes.len(), "saved session");
        Ok(())
    }
}

/// Errors that can occur during session storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    IoError(PathBuf, io::Error),
    /// Error parsing or encoding the session file.
    LoadError(PathBuf, String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::LoadError(path, e) => {
                write!(f, "Failed to load session {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(_, e) => Some(e),
            StorageError::LoadError(_, _) => None,
        }
    }
}
