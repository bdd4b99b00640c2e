//! Persisted session storage
//!
//! File-backed analog of the browser's local storage: the current session is
//! written out on every change so a restart can pick up where the user left
//! off instead of forcing a fresh sign-in.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use common::error::{BackendError, BackendResult};
use session::Session;

/// Stores the current session as a JSON file
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `$SPORTSSPOT_SESSION_FILE`, falling back to
    /// `$HOME/.sportsspot/session.json`
    pub fn default_location() -> PathBuf {
        if let Some(path) = std::env::var_os("SPORTSSPOT_SESSION_FILE") {
            return PathBuf::from(path);
        }

        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
            .join(".sportsspot")
            .join("session.json")
    }

    /// Read the persisted session, if one exists
    pub fn load(&self) -> BackendResult<Option<Session>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(BackendError::Storage(err)),
        }
    }

    /// Write the session, creating parent directories as needed
    pub fn save(&self, session: &Session) -> BackendResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(BackendError::Storage)?;
        }

        let bytes = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, bytes).map_err(BackendError::Storage)?;
        debug!("session persisted to {}", self.path.display());
        Ok(())
    }

    /// Remove the persisted session; removing an absent file is not an error
    pub fn clear(&self) -> BackendResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(BackendError::Storage(err)),
        }
    }
}
