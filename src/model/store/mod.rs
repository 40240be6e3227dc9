//! Persistence for the three named collections (credentials, ballots, roster).
//!
//! Core logic only ever talks to the [`Persistence`] port; the unit of
//! atomicity it offers is replacing one whole collection.

use std::io;

use rocket::serde::json::serde_json;
use thiserror::Error;

mod collection;
mod file;
mod memory;

pub use collection::{Coll, StoredCollection};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure on collection '{collection}': {source}")]
    Io {
        collection: String,
        #[source]
        source: io::Error,
    },
    #[error("Malformed collection '{collection}': {source}")]
    Format {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable storage for whole, named collections.
pub trait Persistence: Send + Sync {
    /// Read the raw contents of a collection, or `None` if it has never been written.
    fn read(&self, collection: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Atomically replace the entire contents of a collection.
    /// Readers observe either the old or the new contents, never a mix.
    fn replace(&self, collection: &str, contents: &[u8]) -> Result<(), StoreError>;
}
