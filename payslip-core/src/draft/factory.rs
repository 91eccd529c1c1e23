use std::collections::HashMap;

use async_trait::async_trait;

use super::storage::{DraftStorage, MemoryStorage, StorageError};

/// Backend-agnostic storage configuration.
///
/// `backend` must match the [`StorageFactory::backend_name`] of a registered
/// factory. `connection_string` is passed through to that factory unchanged.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `memory`   | ignored                             |
/// | `sqlite`   | `drafts.db`, `sqlite::memory:`      |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub connection_string: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "payslip-drafts.db".to_string(),
        }
    }
}

/// One implementation per storage backend, registered with a
/// [`StorageRegistry`] at startup.
#[async_trait]
pub trait StorageFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the backing store. Implementations may run
    /// migrations here.
    async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Box<dyn DraftStorage>, StorageError>;
}

/// Factory for [`MemoryStorage`]. Always available.
pub struct MemoryStorageFactory;

#[async_trait]
impl StorageFactory for MemoryStorageFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &StorageConfig,
    ) -> Result<Box<dyn DraftStorage>, StorageError> {
        Ok(Box::new(MemoryStorage::new()))
    }
}

/// Registry of [`StorageFactory`] instances, keyed by backend name.
pub struct StorageRegistry {
    factories: HashMap<&'static str, Box<dyn StorageFactory>>,
}

impl StorageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry that already knows the in-memory backend.
    pub fn with_memory() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MemoryStorageFactory));
        registry
    }

    /// Register a backend factory, replacing any factory with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn StorageFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend`.
    ///
    /// # Errors
    /// * [`StorageError::Configuration`] if no factory is registered for the
    ///   requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Box<dyn DraftStorage>, StorageError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                StorageError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for StorageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
