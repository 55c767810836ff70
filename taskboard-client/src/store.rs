use chrono::Utc;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use taskboard_core::Task;
use tracing::debug;

use crate::errors::ClientError;
use crate::queries::Queries;

/// Fixed storage key for the serialized task collection.
pub const SNAPSHOT_KEY: &str = "tasks";

/// SQLite-backed persistence for the full task collection: one key, one
/// JSON value, overwritten on every mutation.
pub struct SnapshotStore {
    pub(crate) pool: SqlitePool,
}

impl SnapshotStore {
    pub async fn new(database_url: &str) -> Result<Self, ClientError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the snapshot schema if it does not exist yet.
    pub async fn init_schema(&self) -> Result<(), ClientError> {
        sqlx::query(Queries::SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Read the persisted collection. `None` when nothing was ever saved.
    pub async fn load(&self) -> Result<Option<Vec<Task>>, ClientError> {
        let row = sqlx::query(Queries::GET_SNAPSHOT)
            .bind(SNAPSHOT_KEY)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let value: String = row.get("value");
                Ok(Some(serde_json::from_str(&value)?))
            }
            None => Ok(None),
        }
    }

    /// Overwrite the persisted collection with the full current state.
    pub async fn save(&self, tasks: &[Task]) -> Result<(), ClientError> {
        let value = serde_json::to_string(tasks)?;

        sqlx::query(Queries::UPSERT_SNAPSHOT)
            .bind(SNAPSHOT_KEY)
            .bind(value)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        debug!(count = tasks.len(), "snapshot saved");
        Ok(())
    }

    /// Drop the persisted collection entirely.
    pub async fn clear(&self) -> Result<(), ClientError> {
        sqlx::query(Queries::DELETE_SNAPSHOT)
            .bind(SNAPSHOT_KEY)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
