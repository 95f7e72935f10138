mod controller;
mod progress;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{Round, RoundController, SessionId, SessionPhase, SubmitOutcome, TickOutcome};
pub use progress::SessionProgress;
pub use workflow::{QuizCommand, QuizEvent, QuizHandle, QuizLoopService, RunningQuiz};
