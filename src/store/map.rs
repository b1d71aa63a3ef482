//! MapStore implementation
//!
//! HashMap-based store with RwLock for concurrency.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::Store;
use crate::error::{Result, TabError};

/// Lock-guarded string map
#[derive(Debug, Default)]
pub struct MapStore {
    data: RwLock<HashMap<String, String>>,
}

impl MapStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Copy of every entry, sorted by key
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let data = self.data.read();
        let mut entries: Vec<(String, String)> = data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl Store for MapStore {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.data.write().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<String> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| TabError::KeyNotFound(key.to_owned()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }
}
