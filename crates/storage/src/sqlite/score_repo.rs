use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{ScoreStore, StorageError};

use super::SqliteRepository;

#[async_trait]
impl ScoreStore for SqliteRepository {
    async fn load_high_score(&self) -> Result<u32, StorageError> {
        let row = sqlx::query("SELECT value FROM high_score WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(0);
        };

        let value: i64 = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        u32::try_from(value)
            .map_err(|_| StorageError::Serialization(format!("high score out of range: {value}")))
    }

    async fn save_high_score(&self, value: u32) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO high_score (id, value, updated_at)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(i64::from(value))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
