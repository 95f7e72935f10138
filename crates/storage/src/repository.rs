use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable home of the single best-score value.
///
/// Implementations must make `save_high_score` atomic: after a crash the
/// stored value is either the previous score or the new one, never a partial write.
#[async_trait]
pub trait HighScoreRepository: Send + Sync {
    /// Read the stored high score.
    ///
    /// Returns `0` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or holds an invalid value.
    async fn load_high_score(&self) -> Result<u32, StorageError>;

    /// Replace the stored high score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn save_high_score(&self, score: u32) -> Result<(), StorageError>;

    /// Forget the stored high score, so the next load returns `0`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be removed.
    async fn clear_high_score(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    high_score: Arc<Mutex<Option<u32>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            high_score: Arc::new(Mutex::new(None)),
        }
    }

    /// Repository pre-seeded with a stored high score.
    #[must_use]
    pub fn with_high_score(score: u32) -> Self {
        Self {
            high_score: Arc::new(Mutex::new(Some(score))),
        }
    }
}

#[async_trait]
impl HighScoreRepository for InMemoryRepository {
    async fn load_high_score(&self) -> Result<u32, StorageError> {
        let guard = self
            .high_score
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.unwrap_or(0))
    }

    async fn save_high_score(&self, score: u32) -> Result<(), StorageError> {
        let mut guard = self
            .high_score
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(score);
        Ok(())
    }

    async fn clear_high_score(&self) -> Result<(), StorageError> {
        let mut guard = self
            .high_score
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub high_scores: Arc<dyn HighScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let high_scores: Arc<dyn HighScoreRepository> = Arc::new(InMemoryRepository::new());
        Self { high_scores }
    }
}
