//! Draft persistence: a key-value storage port, its backends, and the
//! [`DraftStore`] that maps a payslip form onto storage keys.

pub mod factory;
pub mod storage;
pub mod store;

pub use factory::{MemoryStorageFactory, StorageConfig, StorageFactory, StorageRegistry};
pub use storage::{DraftStorage, MemoryStorage, StorageError};
pub use store::{DEFAULT_NAMESPACE, DraftKeys, DraftSnapshot, DraftStore};
