use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reaction_core::model::{CorrectCount, ScoreHistoryEntry};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{HistoryLog, StorageError};

use super::SqliteRepository;

fn map_history_row(row: &SqliteRow) -> Result<ScoreHistoryEntry, StorageError> {
    let recorded_at: DateTime<Utc> = row
        .try_get("recorded_at")
        .map_err(|err| StorageError::Serialization(err.to_string()))?;
    let score: i64 = row
        .try_get("score")
        .map_err(|err| StorageError::Serialization(err.to_string()))?;
    let correct: i64 = row
        .try_get("correct_fields")
        .map_err(|err| StorageError::Serialization(err.to_string()))?;

    let score = u32::try_from(score)
        .map_err(|_| StorageError::Serialization(format!("score out of range: {score}")))?;
    let correct = u8::try_from(correct)
        .map_err(|_| StorageError::Serialization(format!("correct fields out of range: {correct}")))
        .and_then(|v| {
            CorrectCount::new(v).map_err(|e| StorageError::Serialization(e.to_string()))
        })?;

    Ok(ScoreHistoryEntry::new(recorded_at, score, correct))
}

#[async_trait]
impl HistoryLog for SqliteRepository {
    async fn append_history(&self, entry: &ScoreHistoryEntry) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO score_history (recorded_at, score, correct_fields)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(entry.recorded_at())
        .bind(i64::from(entry.score()))
        .bind(i64::from(entry.correct_fields().value()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn list_history(&self, limit: usize) -> Result<Vec<ScoreHistoryEntry>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        // Newest first for the LIMIT, then flipped back to chronological order.
        let rows = sqlx::query(
            r"
                SELECT recorded_at, score, correct_fields
                FROM score_history
                ORDER BY id DESC
                LIMIT ?1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows.iter().rev() {
            out.push(map_history_row(row)?);
        }
        Ok(out)
    }
}
