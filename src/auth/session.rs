//! Session store and persisted credential token
//!
//! The session moves through `initialize` (decode the stored token),
//! active (identity set) and cleared (`logout`). It is an explicit value
//! handed to the view-models; there is no global session.

use crate::auth::jwt::decode_identity;
use crate::auth::models::Identity;
use crate::core::error::{ErrorContext, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Storage for the single persisted credential token
pub trait TokenStore: Send + Sync {
    /// Read the token, if one is stored
    fn load(&self) -> Result<Option<String>>;

    /// Store the token, replacing any previous one
    fn store(&self, token: &str) -> Result<()>;

    /// Remove the token; removing an absent token is not an error
    fn clear(&self) -> Result<()>;
}

/// Token kept in a small JSON document on disk, under a fixed key
///
/// Other keys in the document are preserved.
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {:?}", self.path))?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            // An unreadable document holds nothing worth keeping
            _ => {
                tracing::warn!(path = ?self.path, "Session file is not a JSON object, ignoring it");
                Ok(Map::new())
            }
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create session directory {:?}", parent))?;
            }
        }

        let raw = serde_json::to_string_pretty(document)
            .context("Failed to encode session file")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write session file {:?}", self.path))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let document = self.read_document()?;
        Ok(document
            .get(&self.key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut document = self.read_document()?;
        document.insert(self.key.clone(), Value::String(token.to_string()));
        self.write_document(&document)
    }

    fn clear(&self) -> Result<()> {
        let mut document = self.read_document()?;
        if document.remove(&self.key).is_some() {
            self.write_document(&document)?;
        }
        Ok(())
    }
}

/// In-process token storage
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn store(&self, token: &str) -> Result<()> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

/// Holds the current identity and publishes every change
pub struct SessionStore {
    tokens: Arc<dyn TokenStore>,
    identity: watch::Sender<Option<Identity>>,
}

impl SessionStore {
    /// Create an unauthenticated session over the given token storage
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let (identity, _) = watch::channel(None);
        Self { tokens, identity }
    }

    /// Restore the identity from the persisted token
    ///
    /// A token that cannot be decoded is removed. Either way the caller only
    /// learns whether a session is active.
    pub fn initialize(&self) -> bool {
        let token = match self.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::debug!("No persisted token, session is unauthenticated");
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted token");
                return false;
            }
        };

        match decode_identity(&token) {
            Ok(identity) => {
                tracing::info!(user_id = %identity.id, role = %identity.role, "Session restored");
                self.identity.send_replace(Some(identity));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Persisted token could not be decoded, discarding it");
                if let Err(e) = self.tokens.clear() {
                    tracing::warn!(error = %e, "Failed to remove undecodable token");
                }
                self.identity.send_replace(None);
                false
            }
        }
    }

    /// Persist a freshly issued token and adopt the identity that came with it
    pub fn begin(&self, token: &str, identity: Identity) -> Result<()> {
        self.tokens.store(token)?;
        self.set_identity(identity);
        Ok(())
    }

    /// Replace the current identity
    pub fn set_identity(&self, identity: Identity) {
        tracing::debug!(user_id = %identity.id, role = %identity.role, "Identity updated");
        self.identity.send_replace(Some(identity));
    }

    /// Forget the token and the identity
    pub fn logout(&self) -> Result<()> {
        self.tokens.clear()?;
        if self.identity.send_replace(None).is_some() {
            tracing::info!("Logged out");
        }
        Ok(())
    }

    /// Current identity, if authenticated
    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    /// Persisted token, read fresh from storage
    pub fn token(&self) -> Result<Option<String>> {
        self.tokens.load()
    }

    /// Token storage shared with the gateway
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    /// Observe identity changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }
}
