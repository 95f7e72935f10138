#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod export_service;
pub mod high_score_service;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, ExportError, HighScoreServiceError, SessionError};
pub use export_service::{DEFAULT_EXPORT_FILE, ExportService};
pub use high_score_service::HighScoreService;

pub use sessions::{
    QuizCommand, QuizEvent, QuizHandle, QuizLoopService, Round, RoundController, RunningQuiz,
    SessionId, SessionPhase, SessionProgress, SubmitOutcome, TickOutcome,
};
