//! Storage abstractions for service layer
//!
//! A `CollectionStorage` reads and writes one whole collection at a time.
//! Stores never append or patch in place.

use async_trait::async_trait;
use thiserror::Error;

use crate::record::Record;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot read {location}: {message}")]
    Read { location: String, message: String },
    #[error("cannot parse {location}: {message}")]
    Parse { location: String, message: String },
    #[error("cannot encode collection for {location}: {message}")]
    Encode { location: String, message: String },
    #[error("cannot write {location}: {message}")]
    Write { location: String, message: String },
}

/// Get/put of a complete collection.
#[async_trait]
pub trait CollectionStorage: Send + Sync {
    /// Load every record. A location that does not exist yet is an empty collection.
    async fn load(&self) -> Result<Vec<Record>, StorageError>;

    /// Replace the stored collection with `records`.
    async fn save(&self, records: &[Record]) -> Result<(), StorageError>;

    /// Human-readable location for logs and errors.
    fn location(&self) -> String;
}
