//! Persisted token storage.
//!
//! The bearer token is the only client state that survives a session;
//! everything else is re-fetched. The trait keeps the persistence
//! mechanism swappable: a file under the user's home directory for the
//! CLI, plain memory for tests.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("failed to access token storage: {0}")]
    Io(#[from] io::Error),
}

/// Persisted-token abstraction
pub trait TokenStore: Send + Sync {
    /// Load the persisted token, if any
    fn load(&self) -> Result<Option<String>, TokenStoreError>;

    /// Persist the token, replacing any previous one
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Remove the persisted token
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// File-backed store used by the CLI
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.token.lock().expect("token lock poisoned").clone())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.token.lock().expect("token lock poisoned") = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.token.lock().expect("token lock poisoned") = None;
        Ok(())
    }
}
