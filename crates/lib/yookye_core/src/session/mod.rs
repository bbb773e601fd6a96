//! Client-side session persistence.
//!
//! Owns the access/refresh token pair. The pair is always written and
//! removed as a unit: a reader can never observe an access token without
//! its paired refresh token or vice versa. No network I/O happens here.

pub mod claims;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Session persistence errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed session data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("No config directory available on this platform")]
    NoConfigDir,
}

/// Access/refresh token pair.
///
/// The refresh token is optional in the wire contract but the two fields
/// live and die together in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: Option<String>,
}

/// File-backed store for the token pair.
///
/// Saves go through a temp file in the same directory followed by a
/// rename, so a concurrent reader sees either the old pair or the new
/// one, never a partial write. An interior mutex serializes access for
/// multi-threaded callers.
pub struct SessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SessionStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Default session file under the platform config directory.
    pub fn default_path() -> Result<PathBuf, SessionError> {
        let base = dirs::config_dir().ok_or(SessionError::NoConfigDir)?;
        Ok(base.join("yookye").join("session.json"))
    }

    /// Create a store at the default platform location.
    pub fn open_default() -> Result<Self, SessionError> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Persist the pair. Both fields are written in one atomic replace.
    pub fn save(&self, pair: &TokenPair) -> Result<(), SessionError> {
        let _guard = self.guard();
        let parent = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut tmp, pair)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| SessionError::Io(e.error))?;
        Ok(())
    }

    /// Load the persisted pair, or `None` when logged out.
    ///
    /// A malformed file is treated as logged out rather than an error;
    /// the next save or clear overwrites it.
    pub fn load(&self) -> Option<TokenPair> {
        let _guard = self.guard();
        let bytes = fs::read(&self.path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!("ignoring malformed session file: {e}");
                None
            }
        }
    }

    /// Remove both tokens unconditionally. Idempotent.
    pub fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.guard();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.load().map(|pair| pair.access)
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.load().and_then(|pair| pair.refresh)
    }

    /// Authenticated means an access token is present. The server profile
    /// endpoint remains the authority on whether it is still valid.
    pub fn is_authenticated(&self) -> bool {
        self.load().is_some()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}
