//! Key/value persistence for the browser session.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` reads and writes the token, user and settings records through
//! `SessionStore`. The backing `Storage` is `WebStorage` in the browser and
//! `MemoryStorage` in native builds and tests.
//!
//! ERROR HANDLING
//! ==============
//! Reads never fail: missing keys, unavailable storage and corrupt JSON all
//! read as absent. Writes report `StorageError` so callers can roll back.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::StorageKeys;
use crate::net::types::User;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage write failed for {key}")]
    WriteFailed { key: String },
    #[error("could not encode {key}: {message}")]
    Encode { key: String, message: String },
}

/// String key/value store.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] when the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str);
}

/// In-process storage. Optionally refuses writes to given keys, which lets
/// tests exercise the rollback paths.
#[derive(Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    failing: RefCell<Vec<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later write to `key` fail.
    pub fn fail_writes_to(&self, key: &str) {
        self.failing.borrow_mut().push(key.to_owned());
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing.borrow().iter().any(|k| k == key) {
            return Err(StorageError::WriteFailed { key: key.to_owned() });
        }
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// `localStorage`, falling back to `sessionStorage` when the former is
/// disabled (private browsing, policy).
#[cfg(feature = "hydrate")]
pub struct WebStorage {
    inner: Option<web_sys::Storage>,
}

#[cfg(feature = "hydrate")]
impl WebStorage {
    pub fn new() -> Self {
        let window = web_sys::window();
        let local = window
            .as_ref()
            .and_then(|w| w.local_storage().ok().flatten())
            .filter(Self::probe);
        let inner = local.or_else(|| {
            log::warn!("localStorage unavailable; using sessionStorage");
            window.as_ref().and_then(|w| w.session_storage().ok().flatten())
        });
        Self { inner }
    }

    fn probe(storage: &web_sys::Storage) -> bool {
        const PROBE_KEY: &str = "__storage_test__";
        let ok = storage.set_item(PROBE_KEY, PROBE_KEY).is_ok();
        let _ = storage.remove_item(PROBE_KEY);
        ok
    }
}

#[cfg(feature = "hydrate")]
impl Default for WebStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "hydrate")]
impl Storage for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.inner.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|_| StorageError::WriteFailed { key: key.to_owned() })
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.inner {
            let _ = storage.remove_item(key);
        }
    }
}

/// Typed access to the three session records.
pub struct SessionStore {
    storage: Rc<dyn Storage>,
    keys: StorageKeys,
}

impl SessionStore {
    pub fn new(storage: Rc<dyn Storage>, keys: StorageKeys) -> Self {
        Self { storage, keys }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(&self.keys.token).filter(|t| !t.is_empty())
    }

    /// # Errors
    ///
    /// Propagates the storage write failure.
    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(&self.keys.token, token)
    }

    /// Stored user record. Corrupt JSON reads as absent.
    pub fn user(&self) -> Option<User> {
        let raw = self.storage.get(&self.keys.user)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("stored user record is unreadable: {e}");
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`StorageError::Encode`] or the storage write failure.
    pub fn set_user(&self, user: &User) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user).map_err(|e| StorageError::Encode {
            key: self.keys.user.clone(),
            message: e.to_string(),
        })?;
        self.storage.set(&self.keys.user, &raw)
    }

    /// Free-form UI settings; `Null` when absent or unreadable.
    pub fn settings(&self) -> serde_json::Value {
        self.storage
            .get(&self.keys.settings)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or(serde_json::Value::Null)
    }

    /// # Errors
    ///
    /// Propagates the storage write failure.
    pub fn set_settings(&self, settings: &serde_json::Value) -> Result<(), StorageError> {
        self.storage.set(&self.keys.settings, &settings.to_string())
    }

    pub fn remove_token(&self) {
        self.storage.remove(&self.keys.token);
    }

    pub fn remove_user(&self) {
        self.storage.remove(&self.keys.user);
    }

    /// Remove all three records.
    pub fn clear(&self) {
        self.storage.remove(&self.keys.token);
        self.storage.remove(&self.keys.user);
        self.storage.remove(&self.keys.settings);
    }
}
