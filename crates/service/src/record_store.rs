//! Whole-collection CRUD over one `CollectionStorage`.
//!
//! Every call reloads the collection; nothing is cached between calls.
//! Mutations hold the store's write guard from load to persist, so
//! concurrent creates on one store never lose records or share an id.

use std::sync::Arc;

use configs::{IdStrategy, WritePolicy};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::errors::ServiceError;
use crate::record::{Fields, Record};
use crate::resources::ResourceKind;
use crate::storage::CollectionStorage;

pub struct RecordStore {
    resource: ResourceKind,
    storage: Arc<dyn CollectionStorage>,
    write_policy: WritePolicy,
    id_strategy: IdStrategy,
    guard: RwLock<()>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("resource", &self.resource)
            .field("location", &self.storage.location())
            .field("write_policy", &self.write_policy)
            .field("id_strategy", &self.id_strategy)
            .finish()
    }
}

impl RecordStore {
    pub fn new(resource: ResourceKind, storage: Arc<dyn CollectionStorage>) -> Self {
        Self {
            resource,
            storage,
            write_policy: WritePolicy::default(),
            id_strategy: IdStrategy::default(),
            guard: RwLock::new(()),
        }
    }

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    /// Current collection. Read failures degrade to an empty list.
    pub async fn list(&self) -> Vec<Record> {
        let _read = self.guard.read().await;
        self.load_or_empty().await
    }

    /// Append a record with a freshly assigned id and persist the collection.
    pub async fn create(&self, fields: Fields) -> Result<Record, ServiceError> {
        let _write = self.guard.write().await;
        let mut records = self.load_or_empty().await;
        let id = self.next_id(&records)?;
        let record = Record::new(id, fields);
        records.push(record.clone());
        self.persist(&records).await?;
        info!(resource = %self.resource, id, count = records.len(), "record created");
        Ok(record)
    }

    /// Shallow-merge `patch` into every record with `id` and persist.
    /// Returns the first merged record, or `NotFound` without writing.
    pub async fn update(&self, id: i64, patch: Fields) -> Result<Record, ServiceError> {
        let _write = self.guard.write().await;
        let mut records = self.load_or_empty().await;
        let mut updated: Option<Record> = None;
        for rec in records.iter_mut().filter(|r| r.has_id(id)) {
            rec.merge(&patch);
            if updated.is_none() {
                updated = Some(rec.clone());
            }
        }
        let Some(updated) = updated else {
            debug!(resource = %self.resource, id, "update target missing");
            return Err(ServiceError::not_found(self.resource.singular(), id));
        };
        self.persist(&records).await?;
        info!(resource = %self.resource, id, "record updated");
        Ok(updated)
    }

    /// Remove every record with `id`; returns whether any existed.
    /// Missing ids are a successful no-op and leave storage untouched.
    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let _write = self.guard.write().await;
        let mut records = self.load_or_empty().await;
        let before = records.len();
        records.retain(|r| !r.has_id(id));
        let removed = before - records.len();
        if removed == 0 {
            debug!(resource = %self.resource, id, "delete target missing");
            return Ok(false);
        }
        self.persist(&records).await?;
        info!(resource = %self.resource, id, removed, "record deleted");
        Ok(true)
    }

    fn next_id(&self, records: &[Record]) -> Result<i64, ServiceError> {
        let base = match self.id_strategy {
            IdStrategy::Length => i64::try_from(records.len()).unwrap_or(i64::MAX),
            IdStrategy::MaxPlusOne => records.iter().filter_map(Record::id).max().unwrap_or(0).max(0),
        };
        base.checked_add(1).ok_or_else(|| {
            error!(resource = %self.resource, base, "no id left to assign");
            ServiceError::IdExhausted(self.resource.to_string())
        })
    }

    async fn load_or_empty(&self) -> Vec<Record> {
        match self.storage.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(resource = %self.resource, location = %self.storage.location(), error = %e, "load failed; using empty collection");
                Vec::new()
            }
        }
    }

    async fn persist(&self, records: &[Record]) -> Result<(), ServiceError> {
        match self.storage.save(records).await {
            Ok(()) => Ok(()),
            Err(e) => match self.write_policy {
                WritePolicy::Surface => {
                    error!(resource = %self.resource, location = %self.storage.location(), error = %e, "persist failed");
                    Err(ServiceError::Storage(e))
                }
                WritePolicy::Log => {
                    error!(resource = %self.resource, location = %self.storage.location(), error = %e, "persist failed; reporting success");
                    Ok(())
                }
            },
        }
    }
}
