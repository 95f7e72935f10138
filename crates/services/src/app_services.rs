use std::sync::Arc;

use quiz_core::model::QuizSettings;
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::repository::Storage;

use crate::Clock;
use crate::error::{AppServicesError, SessionError};
use crate::export_service::ExportService;
use crate::high_score_service::HighScoreService;
use crate::sessions::{QuizLoopService, RunningQuiz};

/// Assembles app-facing services on top of a storage backend.
#[derive(Clone)]
pub struct AppServices {
    high_scores: Arc<HighScoreService>,
    export: ExportService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let services = Self::from_storage(&storage, clock);
        let high = services.high_scores.load().await?;
        log::debug!("opened {db_url}, stored high score {high}");
        Ok(services)
    }

    /// Build services over process-local storage. Nothing survives a restart.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    fn from_storage(storage: &Storage, clock: Clock) -> Self {
        Self {
            high_scores: Arc::new(HighScoreService::new(Arc::clone(&storage.high_scores))),
            export: ExportService::new(clock),
        }
    }

    #[must_use]
    pub fn high_scores(&self) -> Arc<HighScoreService> {
        Arc::clone(&self.high_scores)
    }

    #[must_use]
    pub fn export(&self) -> ExportService {
        self.export
    }

    /// Spawn a quiz runner with an entropy-seeded generator.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the stored high score cannot be loaded.
    pub async fn spawn_quiz(&self, settings: QuizSettings) -> Result<RunningQuiz, SessionError> {
        QuizLoopService::spawn(
            settings,
            StdRng::from_os_rng(),
            HighScoreService::clone(&self.high_scores),
        )
        .await
    }
}
