use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CollectionStorage, StorageError};
use crate::record::Record;

/// In-memory collection, used as a test double and for ephemeral stores.
///
/// Reads and writes yield to the scheduler first so unsynchronised callers
/// interleave the way they would against a real file.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    name: String,
    records: RwLock<Vec<Record>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_records(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self { name: name.into(), records: RwLock::new(records), ..Self::default() }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Current contents, bypassing failure injection.
    pub async fn snapshot(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl CollectionStorage for MemoryStorage {
    async fn load(&self) -> Result<Vec<Record>, StorageError> {
        tokio::task::yield_now().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Read { location: self.location(), message: "injected read failure".into() });
        }
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, records: &[Record]) -> Result<(), StorageError> {
        tokio::task::yield_now().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write { location: self.location(), message: "injected write failure".into() });
        }
        *self.records.write().await = records.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        format!("memory:{}", self.name)
    }
}
