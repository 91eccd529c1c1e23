//! `payslip.toml` handling.
//!
//! Values are layered: built-in defaults, then the config file, then
//! environment variables. Command-line flags are applied last by the binary.

use std::io;
use std::path::{Path, PathBuf};

use payslip_core::draft::{DEFAULT_NAMESPACE, StorageConfig};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "payslip.toml";

pub const ENV_STORAGE_BACKEND: &str = "PAYSLIP_STORAGE_BACKEND";
pub const ENV_DB: &str = "PAYSLIP_DB";
pub const ENV_LOG_LEVEL: &str = "PAYSLIP_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSection,
    pub logging: LoggingConfig,
    pub export: ExportConfig,
    pub account: AccountConfig,
}

/// Where drafts are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub backend: String,
    pub connection_string: String,
    /// Key prefix the draft is stored under.
    pub namespace: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        let defaults = StorageConfig::default();
        Self {
            backend: defaults.backend,
            connection_string: defaults.connection_string,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl StorageSection {
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            backend: self.backend.clone(),
            connection_string: self.connection_string.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// A bare level or any `EnvFilter` directive. `RUST_LOG` wins when set.
    pub level: String,
    pub file: Option<PathBuf>,
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            stdout: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Unlocks brand colour, logo and signature.
    pub entitled: bool,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self { entitled: true }
    }
}

impl AppConfig {
    pub fn from_toml(
        input: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`, or `payslip.toml` in the working directory when no path
    /// is given. Only an explicitly named file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_toml(&text, &path),
            Err(error) if !required && error.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Applies `PAYSLIP_*` overrides looked up through `var`.
    pub fn apply_env<F>(
        &mut self,
        var: F,
    ) where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = var(ENV_STORAGE_BACKEND) {
            self.storage.backend = backend;
        }
        if let Some(db) = var(ENV_DB) {
            self.storage.connection_string = db;
        }
        if let Some(level) = var(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }

    pub fn apply_process_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok().filter(|value| !value.is_empty()));
    }
}
