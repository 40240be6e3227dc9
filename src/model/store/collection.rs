use std::marker::PhantomData;
use std::sync::Arc;

use rocket::serde::json::serde_json;
use serde::{de::DeserializeOwned, Serialize};

use super::{Persistence, StoreError};

/// A type that is stored as the elements of one named collection.
pub trait StoredCollection: Serialize + DeserializeOwned {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A typed handle on one collection of the persistence port.
pub struct Coll<T> {
    port: Arc<dyn Persistence>,
    phantom: PhantomData<fn() -> T>,
}

impl<T> Coll<T>
where
    T: StoredCollection,
{
    /// Get a handle on this collection in the given store.
    pub fn new(port: Arc<dyn Persistence>) -> Self {
        Self {
            port,
            phantom: PhantomData,
        }
    }

    /// Load every element. A collection that was never written is empty.
    pub fn load(&self) -> Result<Vec<T>, StoreError> {
        match self.port.read(T::NAME)? {
            Some(contents) => {
                serde_json::from_slice(&contents).map_err(|source| StoreError::Format {
                    collection: T::NAME.to_string(),
                    source,
                })
            }
            None => Ok(Vec::new()),
        }
    }

    /// Replace the whole collection with `items`.
    pub fn replace(&self, items: &[T]) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(items).map_err(|source| StoreError::Format {
            collection: T::NAME.to_string(),
            source,
        })?;
        self.port.replace(T::NAME, &contents)
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self {
            port: self.port.clone(),
            phantom: PhantomData,
        }
    }
}
