use async_trait::async_trait;
use payslip_core::draft::{DraftStorage, StorageConfig, StorageError, StorageFactory};

use crate::storage::SqliteStorage;

/// [`StorageFactory`] for SQLite.
///
/// Register this with a [`payslip_core::draft::StorageRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use payslip_core::draft::StorageRegistry;
/// use payslip_db_sqlite::SqliteStorageFactory;
///
/// let mut registry = StorageRegistry::with_memory();
/// registry.register(Box::new(SqliteStorageFactory));
/// ```
pub struct SqliteStorageFactory;

#[async_trait]
impl StorageFactory for SqliteStorageFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"drafts.db"`. The file is created if it
    ///   does not exist.
    /// * `":memory:"` or `"sqlite::memory:"` for an ephemeral database.
    async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Box<dyn DraftStorage>, StorageError> {
        let storage = SqliteStorage::new(&config.connection_string)
            .await
            .map_err(|e| StorageError::Connection(format!("{e:#}")))?;
        storage
            .run_migrations()
            .await
            .map_err(|e| StorageError::Backend(format!("{e:#}")))?;
        Ok(Box::new(storage))
    }
}
