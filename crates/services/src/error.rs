//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::SettingsError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid quiz settings: {0}")]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    HighScore(#[from] HighScoreServiceError),
    #[error("quiz runner has shut down")]
    RunnerClosed,
}

/// Errors emitted by `HighScoreService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HighScoreServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ExportService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error("failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write result: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    HighScore(#[from] HighScoreServiceError),
}
