use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{HighScoreRepository, StorageError};

use super::SqliteRepository;

/// Row key under which the quiz keeps its best score.
const HIGH_SCORE_KEY: &str = "quickmath";

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl HighScoreRepository for SqliteRepository {
    async fn load_high_score(&self) -> Result<u32, StorageError> {
        let row = sqlx::query("SELECT score FROM high_scores WHERE key = ?1")
            .bind(HIGH_SCORE_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(0);
        };

        let score: i64 = row.try_get("score").map_err(ser)?;
        u32::try_from(score)
            .map_err(|_| StorageError::Serialization(format!("invalid high score: {score}")))
    }

    async fn save_high_score(&self, score: u32) -> Result<(), StorageError> {
        // single UPSERT in its own transaction: readers see the old or the new row
        let mut tx = self.pool.begin().await.map_err(conn)?;
        sqlx::query(
            r"
            INSERT INTO high_scores (key, score, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                score = excluded.score,
                updated_at = excluded.updated_at
            ",
        )
        .bind(HIGH_SCORE_KEY)
        .bind(i64::from(score))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
        tx.commit().await.map_err(conn)?;

        log::debug!("stored high score {score}");
        Ok(())
    }

    async fn clear_high_score(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM high_scores WHERE key = ?1")
            .bind(HIGH_SCORE_KEY)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
