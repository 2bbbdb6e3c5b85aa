//! The three record collections served by the API.

use std::{fmt, sync::Arc};

use configs::{IdStrategy, StorageConfig, WritePolicy};
use tracing::info;

use crate::record_store::RecordStore;
use crate::storage::{CollectionStorage, JsonFileStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    Roles,
    Permissions,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Users, ResourceKind::Roles, ResourceKind::Permissions];

    /// URL segment, e.g. `users`.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Roles => "roles",
            ResourceKind::Permissions => "permissions",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            ResourceKind::Users => "user",
            ResourceKind::Roles => "role",
            ResourceKind::Permissions => "permission",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One store per resource kind; collections never share storage.
#[derive(Debug, Clone)]
pub struct ResourceStores {
    users: Arc<RecordStore>,
    roles: Arc<RecordStore>,
    permissions: Arc<RecordStore>,
}

impl ResourceStores {
    /// JSON-file backed stores laid out under `cfg.data_dir`.
    pub fn open(cfg: &StorageConfig) -> Self {
        let stores = Self::with_storage(
            |kind| -> Arc<dyn CollectionStorage> {
                let path = match kind {
                    ResourceKind::Users => cfg.users_path(),
                    ResourceKind::Roles => cfg.roles_path(),
                    ResourceKind::Permissions => cfg.permissions_path(),
                };
                Arc::new(JsonFileStorage::new(path))
            },
            cfg.write_policy,
            cfg.id_strategy,
        );
        info!(
            data_dir = %cfg.data_dir.display(),
            write_policy = ?cfg.write_policy,
            id_strategy = ?cfg.id_strategy,
            "resource stores opened"
        );
        stores
    }

    pub fn with_storage<F>(mut make: F, write_policy: WritePolicy, id_strategy: IdStrategy) -> Self
    where
        F: FnMut(ResourceKind) -> Arc<dyn CollectionStorage>,
    {
        let mut build = |kind: ResourceKind| {
            Arc::new(
                RecordStore::new(kind, make(kind))
                    .with_write_policy(write_policy)
                    .with_id_strategy(id_strategy),
            )
        };
        Self {
            users: build(ResourceKind::Users),
            roles: build(ResourceKind::Roles),
            permissions: build(ResourceKind::Permissions),
        }
    }

    pub fn get(&self, kind: ResourceKind) -> &Arc<RecordStore> {
        match kind {
            ResourceKind::Users => &self.users,
            ResourceKind::Roles => &self.roles,
            ResourceKind::Permissions => &self.permissions,
        }
    }
}
