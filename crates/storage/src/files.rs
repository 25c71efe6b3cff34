//! Flat-file backend: a text file holding the high score and a CSV history log.
//!
//! Writes are synchronous and unbuffered. There is no locking; a single
//! session owns the files for the process lifetime.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use reaction_core::model::{CorrectCount, ScoreHistoryEntry};
use serde::{Deserialize, Serialize};

use crate::repository::{HistoryLog, ScoreStore, Storage, StorageError};

pub const HIGH_SCORE_FILE: &str = "high_score.txt";
pub const SCORE_HISTORY_FILE: &str = "score_history.csv";

#[derive(Debug, Serialize, Deserialize)]
struct HistoryRow {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Score")]
    score: u32,
    #[serde(rename = "Correct Fields")]
    correct_fields: u8,
}

impl HistoryRow {
    fn from_entry(entry: &ScoreHistoryEntry) -> Self {
        Self {
            timestamp: entry.timestamp_iso(),
            score: entry.score(),
            correct_fields: entry.correct_fields().value(),
        }
    }

    fn into_entry(self) -> Result<ScoreHistoryEntry, StorageError> {
        let recorded_at = parse_timestamp(&self.timestamp)?;
        let correct = CorrectCount::new(self.correct_fields)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(ScoreHistoryEntry::new(recorded_at, self.score, correct))
    }
}

/// Accepts RFC 3339, and naive ISO-8601 without an offset (read as UTC).
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| StorageError::Serialization(format!("invalid timestamp `{raw}`: {e}")))
}

#[derive(Debug, Clone)]
pub struct FileRepository {
    high_score_path: PathBuf,
    history_path: PathBuf,
}

impl FileRepository {
    /// Use the default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            high_score_path: dir.join(HIGH_SCORE_FILE),
            history_path: dir.join(SCORE_HISTORY_FILE),
        }
    }
}

#[async_trait]
impl ScoreStore for FileRepository {
    async fn load_high_score(&self) -> Result<u32, StorageError> {
        let raw = match fs::read_to_string(&self.high_score_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed.parse::<u32>().map_err(|e| {
            StorageError::Serialization(format!(
                "high score in {}: {e}",
                self.high_score_path.display()
            ))
        })
    }

    async fn save_high_score(&self, value: u32) -> Result<(), StorageError> {
        fs::write(&self.high_score_path, value.to_string())?;
        Ok(())
    }
}

#[async_trait]
impl HistoryLog for FileRepository {
    async fn append_history(&self, entry: &ScoreHistoryEntry) -> Result<(), StorageError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_path)?;
        let needs_header = file.metadata()?.len() == 0;

        // The header is emitted by the first `serialize` call only when the file is new.
        let mut writer = WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer
            .serialize(HistoryRow::from_entry(entry))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }

    async fn list_history(&self, limit: usize) -> Result<Vec<ScoreHistoryEntry>, StorageError> {
        let file = match fs::File::open(&self.history_path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut reader = ReaderBuilder::new().from_reader(file);
        let mut entries = Vec::new();
        for row in reader.deserialize::<HistoryRow>() {
            let row = row.map_err(|e| StorageError::Serialization(e.to_string()))?;
            entries.push(row.into_entry()?);
        }

        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
        Ok(entries)
    }
}

impl Storage {
    /// Build a `Storage` backed by flat files in `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn files(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        Ok(Self::from_repo(FileRepository::in_dir(dir)))
    }
}
