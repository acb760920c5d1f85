//! Session credential lifecycle.
//!
//! The bearer token is process-wide state attached to every outgoing
//! request, so its lifecycle is an explicit state machine rather than an
//! incidental side effect of storage reads: a session is issued on
//! sign-in, attached while authenticated, marked expired when the server
//! answers 401, and cleared on sign-out.
//!
//! Persistence goes through the [`TokenStore`] trait. The file-backed store
//! keeps the token across runs (the browser client kept it in local storage
//! under the key `token`); the in-memory store backs tests.

use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the token persistence layer.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("failed to read token: {0}")]
    Read(std::io::Error),
    #[error("failed to write token: {0}")]
    Write(std::io::Error),
    #[error("failed to remove token: {0}")]
    Remove(std::io::Error),
}

/// Persistence for the session token.
pub trait TokenStore: Send + Sync {
    /// Load a previously persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError>;

    /// Persist the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&self, token: &SecretString) -> Result<(), TokenStoreError>;

    /// Remove any persisted token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be modified.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// File-backed token store.
///
/// The token is stored as the file's entire contents, trimmed on load.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store persisting to the given path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(token.to_string())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TokenStoreError::Read(e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), TokenStoreError> {
        std::fs::write(&self.path, token.expose_secret()).map_err(TokenStoreError::Write)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TokenStoreError::Remove(e)),
        }
    }
}

/// In-memory token store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: std::sync::Mutex<Option<SecretString>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError> {
        Ok(self.token.lock().map_or(None, |guard| guard.clone()))
    }

    fn save(&self, token: &SecretString) -> Result<(), TokenStoreError> {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
        Ok(())
    }
}

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No credential held.
    Anonymous,
    /// A token is held and attached to outgoing requests.
    Authenticated,
    /// The server rejected the held token (401). The token is retained so
    /// the caller can decide whether to re-authenticate or sign out.
    Expired,
}

/// The process-wide session credential.
pub struct Session {
    state: SessionState,
    token: Option<SecretString>,
    store: Box<dyn TokenStore>,
}

impl Session {
    /// Restore a session from the given store.
    ///
    /// A persisted token yields an `Authenticated` session; its validity is
    /// only learned when the server first answers.
    #[must_use]
    pub fn restore(store: Box<dyn TokenStore>) -> Self {
        let token = store.load().unwrap_or_else(|e| {
            tracing::warn!("failed to restore session token: {e}");
            None
        });
        let state = if token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        Self {
            state,
            token,
            store,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The token to attach to outgoing requests, if any.
    ///
    /// An expired token is still attached; the server is the authority on
    /// whether it remains usable.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Issue a fresh token (successful sign-in) and persist it.
    pub fn issue(&mut self, token: SecretString) {
        if let Err(e) = self.store.save(&token) {
            tracing::warn!("failed to persist session token: {e}");
        }
        self.token = Some(token);
        self.state = SessionState::Authenticated;
    }

    /// Mark the held token as rejected by the server.
    ///
    /// No-op when anonymous.
    pub fn expire(&mut self) {
        if self.token.is_some() {
            self.state = SessionState::Expired;
        }
    }

    /// Drop the credential (sign-out) and remove it from the store.
    pub fn clear(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("failed to remove persisted session token: {e}");
        }
        self.token = None;
        self.state = SessionState::Anonymous;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}
