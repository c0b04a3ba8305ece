// Session locator persistence
// Remembers which chat session was open across process restarts

use crate::chat::SessionId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Error types for persistence operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// File I/O error
    #[error("IO Error: {0}")]
    IoError(String),
    /// JSON serialization error
    #[error("JSON Error: {0}")]
    JsonError(String),
}

/// On-disk shape of the sidecar file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SessionPointer {
    /// Session that was open when the pointer was last written
    #[serde(default)]
    current_chat_id: Option<SessionId>,
}

/// Tracks the current chat session in a small JSON sidecar file
///
/// The file is the only state that outlives the process; the database never
/// records which session is open.
#[derive(Debug, Clone)]
pub struct SessionLocator {
    path: PathBuf,
}

impl SessionLocator {
    /// Create a locator backed by the given sidecar path
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path of the sidecar file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted pointer
    ///
    /// A missing file means no current session. Unreadable or corrupt files
    /// are logged and also treated as no current session.
    pub fn load(&self) -> Option<SessionId> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read session state");
                return None;
            }
        };

        match serde_json::from_str::<SessionPointer>(&json) {
            Ok(pointer) => pointer.current_chat_id,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session state");
                None
            }
        }
    }

    /// Overwrite the pointer with the given session
    ///
    /// Writes a temporary file next to the sidecar and renames it into place.
    pub fn save(&self, session_id: SessionId) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| PersistenceError::IoError(e.to_string()))?;
            }
        }

        let pointer = SessionPointer {
            current_chat_id: Some(session_id),
        };
        let json = serde_json::to_string(&pointer)
            .map_err(|e| PersistenceError::JsonError(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| PersistenceError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| PersistenceError::IoError(e.to_string()))?;

        debug!(session_id = session_id, "Saved current session pointer");
        Ok(())
    }

    /// Remove the pointer entirely
    ///
    /// Clearing an already absent pointer succeeds.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Cleared current session pointer");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::IoError(e.to_string())),
        }
    }
}
