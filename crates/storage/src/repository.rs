use async_trait::async_trait;
use reaction_core::model::ScoreHistoryEntry;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence for the single high-score value.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Read the persisted high score, or 0 if none has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or holds a non-numeric value.
    async fn load_high_score(&self) -> Result<u32, StorageError>;

    /// Overwrite the persisted high score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn save_high_score(&self, value: u32) -> Result<(), StorageError>;
}

/// Append-only log of scored attempts.
#[async_trait]
pub trait HistoryLog: Send + Sync {
    /// Append one entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be written.
    async fn append_history(&self, entry: &ScoreHistoryEntry) -> Result<(), StorageError>;

    /// The most recent `limit` entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read or contains invalid rows.
    async fn list_history(&self, limit: usize) -> Result<Vec<ScoreHistoryEntry>, StorageError>;
}

/// Simple in-memory repository implementation for testing and ephemeral play.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    high_score: Arc<Mutex<Option<u32>>>,
    history: Arc<Mutex<Vec<ScoreHistoryEntry>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a previously stored high score.
    #[must_use]
    pub fn with_high_score(value: u32) -> Self {
        Self {
            high_score: Arc::new(Mutex::new(Some(value))),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of every appended entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn history_snapshot(&self) -> Result<Vec<ScoreHistoryEntry>, StorageError> {
        let guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl ScoreStore for InMemoryRepository {
    async fn load_high_score(&self) -> Result<u32, StorageError> {
        let guard = self
            .high_score
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.unwrap_or(0))
    }

    async fn save_high_score(&self, value: u32) -> Result<(), StorageError> {
        let mut guard = self
            .high_score
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(value);
        Ok(())
    }
}

#[async_trait]
impl HistoryLog for InMemoryRepository {
    async fn append_history(&self, entry: &ScoreHistoryEntry) -> Result<(), StorageError> {
        let mut guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(entry.clone());
        Ok(())
    }

    async fn list_history(&self, limit: usize) -> Result<Vec<ScoreHistoryEntry>, StorageError> {
        let guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let skip = guard.len().saturating_sub(limit);
        Ok(guard[skip..].to_vec())
    }
}

/// Where scores and history are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// `high_score.txt` and `score_history.csv` inside a directory.
    Files { dir: PathBuf },
    /// A `SQLite` database URL.
    Sqlite { url: String },
    /// Nothing survives the process.
    Memory,
}

/// Aggregates the score and history stores behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub scores: Arc<dyn ScoreStore>,
    pub history: Arc<dyn HistoryLog>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repo(InMemoryRepository::new())
    }

    /// Use one repository for both concerns.
    #[must_use]
    pub fn from_repo<R>(repo: R) -> Self
    where
        R: ScoreStore + HistoryLog + Clone + 'static,
    {
        let scores: Arc<dyn ScoreStore> = Arc::new(repo.clone());
        let history: Arc<dyn HistoryLog> = Arc::new(repo);
        Self { scores, history }
    }

    /// Open whichever backend is configured.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be prepared.
    pub async fn open(backend: &StorageBackend) -> Result<Self, StorageError> {
        match backend {
            StorageBackend::Files { dir } => Ok(Self::files(dir)?),
            StorageBackend::Sqlite { url } => Self::sqlite(url)
                .await
                .map_err(|e| StorageError::Connection(e.to_string())),
            StorageBackend::Memory => Ok(Self::in_memory()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaction_core::model::CorrectCount;
    use reaction_core::time::fixed_now;

    fn entry(score: u32) -> ScoreHistoryEntry {
        ScoreHistoryEntry::new(fixed_now(), score, CorrectCount::new(1).unwrap())
    }

    #[tokio::test]
    async fn high_score_defaults_to_zero_and_overwrites() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.load_high_score().await.unwrap(), 0);

        repo.save_high_score(40).await.unwrap();
        repo.save_high_score(70).await.unwrap();
        assert_eq!(repo.load_high_score().await.unwrap(), 70);
    }

    #[tokio::test]
    async fn history_lists_most_recent_in_order() {
        let repo = InMemoryRepository::new();
        for score in [10, 20, 30] {
            repo.append_history(&entry(score)).await.unwrap();
        }

        let recent = repo.list_history(2).await.unwrap();
        let scores: Vec<_> = recent.iter().map(ScoreHistoryEntry::score).collect();
        assert_eq!(scores, [20, 30]);
        assert_eq!(repo.list_history(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn storage_shares_one_repo() {
        let repo = InMemoryRepository::with_high_score(50);
        let storage = Storage::from_repo(repo.clone());
        storage.history.append_history(&entry(5)).await.unwrap();

        assert_eq!(storage.scores.load_high_score().await.unwrap(), 50);
        assert_eq!(repo.history_snapshot().unwrap().len(), 1);
    }
}
