use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use payslip_core::draft::{DraftStorage, StorageError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use tracing::debug;

/// Draft storage in a single SQLite key-value table.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens `database_url`, creating the file if needed. Accepts bare paths,
    /// `sqlite:` URLs and `:memory:`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database location: {}", database_url))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn backend_error(error: sqlx::Error) -> StorageError {
    StorageError::Backend(error.to_string())
}

#[async_trait]
impl DraftStorage for SqliteStorage {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM draft_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        sqlx::query(
            "INSERT INTO draft_entries (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        debug!(key, bytes = value.len(), "stored draft entry");
        Ok(())
    }

    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM draft_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use payslip_core::draft::DraftStore;
    use payslip_core::models::{AssetSlot, ImageAsset, PayslipFormState};
    use pretty_assertions::assert_eq;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> SqliteStorage {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let storage = SqliteStorage::new_with_pool(pool).await;
        storage.run_migrations().await.expect("Failed to run migrations");
        storage
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let storage = setup_test_db().await;

        assert_eq!(storage.get("nothing").await, Ok(None));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let storage = setup_test_db().await;

        storage.set("k", "v1").await.expect("Should store value");

        assert_eq!(storage.get("k").await, Ok(Some("v1".to_string())));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let storage = setup_test_db().await;

        storage.set("k", "v1").await.expect("Should store value");
        storage.set("k", "v2").await.expect("Should overwrite value");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM draft_entries")
            .fetch_one(storage.pool())
            .await
            .expect("Should count rows");
        assert_eq!(count, 1);
        assert_eq!(storage.get("k").await, Ok(Some("v2".to_string())));
    }

    #[tokio::test]
    async fn test_remove() {
        let storage = setup_test_db().await;
        storage.set("k", "v").await.expect("Should store value");

        storage.remove("k").await.expect("Should remove value");
        storage.remove("k").await.expect("Removing twice is fine");

        assert_eq!(storage.get("k").await, Ok(None));
    }

    #[tokio::test]
    async fn test_draft_store_round_trip() {
        let storage: Arc<dyn DraftStorage> = Arc::new(setup_test_db().await);
        let drafts = DraftStore::with_default_keys(storage);
        let mut form = PayslipFormState {
            employee_name: "Ada Obi".to_string(),
            pay_rate: "150000".to_string(),
            ..Default::default()
        };
        form.set_asset(
            AssetSlot::Logo,
            Some(ImageAsset::restored("data:image/png;base64,AAAA".to_string())),
        );

        drafts.save(&form).await;
        let restored = drafts.load().await.into_form_state();

        assert_eq!(restored.employee_name, "Ada Obi");
        assert_eq!(restored.pay_rate, "150000");
        assert_eq!(
            restored.logo.as_ref().map(ImageAsset::data_url),
            Some("data:image/png;base64,AAAA")
        );
    }
}
