use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{Persistence, StoreError};

/// A volatile store, for tests and throwaway instances.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryStore {
    fn read(&self, collection: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(collections.get(collection).cloned())
    }

    fn replace(&self, collection: &str, contents: &[u8]) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
        collections.insert(collection.to_string(), contents.to_vec());
        Ok(())
    }
}
