//! Service layer: schemaless record collections persisted as flat JSON files.
//! - `storage` abstracts whole-collection get/put behind `CollectionStorage`.
//! - `record_store` implements list/create/update/delete with id assignment.
//! - `resources` wires one store per resource kind.

pub mod errors;
pub mod record;
pub mod record_store;
pub mod resources;
pub mod runtime;
pub mod storage;

pub use errors::ServiceError;
pub use record::{Fields, Record};
pub use record_store::RecordStore;
pub use resources::{ResourceKind, ResourceStores};
