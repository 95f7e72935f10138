use std::sync::Arc;

use quiz_core::model::SessionSummary;
use storage::repository::HighScoreRepository;

use crate::error::HighScoreServiceError;

/// Reads and writes the persisted best score.
#[derive(Clone)]
pub struct HighScoreService {
    repo: Arc<dyn HighScoreRepository>,
}

impl HighScoreService {
    #[must_use]
    pub fn new(repo: Arc<dyn HighScoreRepository>) -> Self {
        Self { repo }
    }

    /// Load the persisted high score (`0` if none was stored).
    ///
    /// # Errors
    ///
    /// Returns `HighScoreServiceError` on storage failures.
    pub async fn load(&self) -> Result<u32, HighScoreServiceError> {
        Ok(self.repo.load_high_score().await?)
    }

    /// Persist the high score from a finished session, if it set a new record.
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns `HighScoreServiceError` if persistence fails.
    pub async fn record(&self, summary: &SessionSummary) -> Result<bool, HighScoreServiceError> {
        if !summary.is_new_high_score {
            return Ok(false);
        }
        self.repo.save_high_score(summary.high_score).await?;
        log::info!("new high score {} saved", summary.high_score);
        Ok(true)
    }

    /// Forget the stored high score.
    ///
    /// # Errors
    ///
    /// Returns `HighScoreServiceError` if persistence fails.
    pub async fn reset(&self) -> Result<(), HighScoreServiceError> {
        self.repo.clear_high_score().await?;
        log::info!("high score reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::model::EndReason;
    use storage::repository::InMemoryRepository;

    fn summary(score: u32, high_score: u32, is_new_high_score: bool) -> SessionSummary {
        SessionSummary {
            score,
            rounds_completed: score,
            reason: EndReason::RoundCapReached,
            high_score,
            is_new_high_score,
        }
    }

    #[tokio::test]
    async fn record_persists_only_new_records() {
        let repo = InMemoryRepository::with_high_score(7);
        let service = HighScoreService::new(Arc::new(repo.clone()));

        assert!(!service.record(&summary(5, 7, false)).await.unwrap());
        assert_eq!(repo.load_high_score().await.unwrap(), 7);

        assert!(service.record(&summary(10, 10, true)).await.unwrap());
        assert_eq!(service.load().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn reset_clears_the_stored_value() {
        let service = HighScoreService::new(Arc::new(InMemoryRepository::with_high_score(3)));
        service.reset().await.unwrap();
        assert_eq!(service.load().await.unwrap(), 0);
    }
}
