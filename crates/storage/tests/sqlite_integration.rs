use storage::repository::{HighScoreRepository, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_high_score_defaults_to_zero() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_default?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.load_high_score().await.unwrap(), 0);
}

#[tokio::test]
async fn sqlite_high_score_overwrites_single_row() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_high_score(7).await.unwrap();
    repo.save_high_score(10).await.unwrap();
    assert_eq!(repo.load_high_score().await.unwrap(), 10);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM high_scores")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn sqlite_high_score_survives_reopen() {
    let url = "sqlite:file:memdb_reopen?mode=memory&cache=shared";
    let first = Storage::sqlite(url).await.expect("open");
    first.high_scores.save_high_score(10).await.unwrap();

    // Migrations are idempotent and the value is visible to a second handle.
    let second = Storage::sqlite(url).await.expect("reopen");
    assert_eq!(second.high_scores.load_high_score().await.unwrap(), 10);
}

#[tokio::test]
async fn sqlite_clear_resets_high_score() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_clear?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_high_score(4).await.unwrap();
    repo.clear_high_score().await.unwrap();
    assert_eq!(repo.load_high_score().await.unwrap(), 0);
}
