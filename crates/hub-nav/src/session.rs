//! Auth session - token and email, mirrored in persistent storage.
//!
//! Read once at startup with [`AuthSession::load`]; every later change goes
//! through [`update`](AuthSession::update) or
//! [`sign_out`](AuthSession::sign_out) so memory and storage never drift.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::config::StorageKeys;

/// String key-value storage (`localStorage` in the browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store for tests and native builds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    token: Option<String>,
    email: Option<String>,
    keys: StorageKeys,
}

impl AuthSession {
    /// Restore the session from storage.
    pub fn load(store: &dyn KeyValueStore, keys: StorageKeys) -> Self {
        let token = store.get(&keys.token).filter(|t| !t.trim().is_empty());
        let email = store.get(&keys.email).filter(|e| !e.trim().is_empty());
        tracing::debug!("session: restored (signed in: {})", token.is_some());
        Self { token, email, keys }
    }

    /// Replace token and email, writing through to storage. A blank value
    /// removes its key.
    pub fn update(&mut self, store: &dyn KeyValueStore, token: Option<&str>, email: Option<&str>) {
        self.token = persist(store, &self.keys.token, token);
        self.email = persist(store, &self.keys.email, email);
        tracing::debug!("session: updated (signed in: {})", self.is_signed_in());
    }

    pub fn sign_out(&mut self, store: &dyn KeyValueStore) {
        self.update(store, None, None);
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

fn persist(store: &dyn KeyValueStore, key: &str, value: Option<&str>) -> Option<String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => {
            store.set(key, v);
            Some(v.to_string())
        }
        None => {
            store.remove(key);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_stored_keys() {
        let store = MemoryStore::new();
        store.set("authToken", "abc");
        store.set("authEmail", "ana@example.hr");

        let session = AuthSession::load(&store, StorageKeys::default());
        assert!(session.is_signed_in());
        assert_eq!(session.token(), Some("abc"));
        assert_eq!(session.email(), Some("ana@example.hr"));
    }

    #[test]
    fn blank_token_is_signed_out() {
        let store = MemoryStore::new();
        store.set("authToken", "   ");
        let session = AuthSession::load(&store, StorageKeys::default());
        assert!(!session.is_signed_in());
    }

    #[test]
    fn update_writes_through() {
        let store = MemoryStore::new();
        let mut session = AuthSession::load(&store, StorageKeys::default());

        session.update(&store, Some("tok"), Some("ivo@example.hr"));
        assert_eq!(store.get("authToken").as_deref(), Some("tok"));
        assert_eq!(store.get("authEmail").as_deref(), Some("ivo@example.hr"));

        let restored = AuthSession::load(&store, StorageKeys::default());
        assert_eq!(restored, session);
    }

    #[test]
    fn sign_out_clears_memory_and_storage() {
        let store = MemoryStore::new();
        let mut session = AuthSession::load(&store, StorageKeys::default());
        session.update(&store, Some("tok"), Some("ivo@example.hr"));

        session.sign_out(&store);
        assert!(!session.is_signed_in());
        assert_eq!(session.email(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn custom_keys() {
        let store = MemoryStore::new();
        let keys = StorageKeys {
            token: "t".into(),
            email: "e".into(),
        };
        let mut session = AuthSession::load(&store, keys);
        session.update(&store, Some("x"), None);
        assert_eq!(store.get("t").as_deref(), Some("x"));
        assert_eq!(store.len(), 1);
    }
}
