use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::generator::ScriptedSource;
use quiz_core::model::{EndReason, Mode, QuizSettings};
use services::{HighScoreService, QuizEvent, QuizLoopService, RunningQuiz};
use storage::repository::{HighScoreRepository, InMemoryRepository, StorageError};

struct BrokenRepository;

#[async_trait]
impl HighScoreRepository for BrokenRepository {
    async fn load_high_score(&self) -> Result<u32, StorageError> {
        Ok(0)
    }

    async fn save_high_score(&self, _score: u32) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unplugged".into()))
    }

    async fn clear_high_score(&self) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unplugged".into()))
    }
}

async fn spawn(settings: QuizSettings, repo: Arc<dyn HighScoreRepository>) -> RunningQuiz {
    QuizLoopService::spawn(settings, ScriptedSource::default(), HighScoreService::new(repo))
        .await
        .unwrap()
}

/// Answers every question correctly until the session ends.
async fn play_perfect_game(quiz: &mut RunningQuiz) -> services::SessionProgress {
    let mut last = None;
    while let Some(event) = quiz.events.recv().await {
        match event {
            QuizEvent::Question { round, .. } => {
                quiz.handle.submit(round.question.correct_answer()).unwrap();
            }
            QuizEvent::Answered { progress, .. } => last = Some(progress),
            QuizEvent::Ended { .. } => break,
            QuizEvent::Tick { .. } => {}
            QuizEvent::StartRejected(err) => panic!("start rejected: {err}"),
        }
    }
    last.expect("at least one answer")
}

#[tokio::test(start_paused = true)]
async fn perfect_game_beats_and_persists_high_score() {
    let repo = InMemoryRepository::with_high_score(7);
    let settings = QuizSettings::new(Mode::Add).with_round_cap(10);
    let mut quiz = spawn(settings.clone(), Arc::new(repo.clone())).await;
    quiz.handle.start().unwrap();

    let progress = play_perfect_game(&mut quiz).await;
    assert_eq!(progress.score, 10);
    assert_eq!(progress.rounds_completed, 10);
    assert_eq!(repo.load_high_score().await.unwrap(), 10);

    quiz.handle.shutdown().unwrap();
    quiz.task.await.unwrap();

    let mut next = spawn(settings, Arc::new(repo.clone())).await;
    next.handle.start().unwrap();
    match next.events.recv().await.unwrap() {
        QuizEvent::Question { progress, .. } => assert_eq!(progress.high_score, 10),
        other => panic!("expected question, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn restart_while_active_discards_old_timers() {
    let settings = QuizSettings::new(Mode::Add).with_total_time_secs(5);
    let mut quiz = spawn(settings, Arc::new(InMemoryRepository::new())).await;
    quiz.handle.start().unwrap();

    let first = match quiz.events.recv().await.unwrap() {
        QuizEvent::Question { session, .. } => session,
        other => panic!("expected question, got {other:?}"),
    };
    quiz.handle.submit(2).unwrap();
    quiz.handle.start().unwrap();

    let mut ended_in = None;
    while let Some(event) = quiz.events.recv().await {
        match event {
            QuizEvent::Question { session, progress, .. } if session != first => {
                assert_eq!(progress.score, 0);
                assert_eq!(progress.time_remaining_secs, 5);
            }
            QuizEvent::Tick { session, .. } => assert_ne!(session, first),
            QuizEvent::Ended { session, summary } => {
                assert_eq!(summary.reason, EndReason::TimeExpired);
                ended_in = Some(session);
                break;
            }
            _ => {}
        }
    }
    assert!(ended_in.is_some_and(|session| session > first));
}

#[tokio::test(start_paused = true)]
async fn storage_failure_still_ends_the_session() {
    let settings = QuizSettings::new(Mode::Add).with_round_cap(1);
    let mut quiz = spawn(settings, Arc::new(BrokenRepository)).await;
    quiz.handle.start().unwrap();

    play_perfect_game(&mut quiz).await;
    quiz.handle.stop().unwrap();
    quiz.handle.shutdown().unwrap();
    quiz.task.await.unwrap();
    assert!(quiz.handle.start().is_err());
}
