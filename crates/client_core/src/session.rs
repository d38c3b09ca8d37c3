//! Session token storage behind an injectable seam.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::debug;

use crate::error::SessionError;

/// Storage key holding the session token.
pub const TOKEN_KEY: &str = "token";

pub trait SessionStore: Send + Sync {
    fn token(&self) -> Result<Option<String>, SessionError>;
    fn set_token(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;

    fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.token()?.is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Result<Option<String>, SessionError> {
        let guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(guard.clone())
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        let mut guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Key-value JSON file on disk. Every access goes to the file, so another
/// process logging in or out is observed on the next read.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(self.io_error(err)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, raw).map_err(|err| self.io_error(err))
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Result<Option<String>, SessionError> {
        Ok(self.read_entries()?.remove(TOKEN_KEY))
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)?;
        debug!(path = %self.path.display(), "session: token stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut entries = self.read_entries()?;
        if entries.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)?;
        debug!(path = %self.path.display(), "session: token cleared");
        Ok(())
    }
}

impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    fn token(&self) -> Result<Option<String>, SessionError> {
        (**self).token()
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        (**self).set_token(token)
    }

    fn clear(&self) -> Result<(), SessionError> {
        (**self).clear()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
