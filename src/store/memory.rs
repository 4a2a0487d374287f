use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::{Store, StoreError};

/// In-process store. Used by tests and as a fake for the file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    failing_keys: RwLock<HashSet<String>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Makes every later `set` or `remove` of `key` fail.
    pub fn fail_writes_to(&self, key: &str) {
        if let Ok(mut keys) = self.failing_keys.write() {
            keys.insert(key.to_string());
        }
    }

    fn check_writable(&self, key: &str) -> Result<(), StoreError> {
        if self.failing_keys.read().map_err(poisoned)?.contains(key) {
            return Err(StoreError::Unavailable(format!("writes to {key} are rejected")));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable(key)?;
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_writable(key)?;
        self.entries.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}
