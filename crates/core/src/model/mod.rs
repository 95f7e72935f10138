mod operator;
mod question;
mod session;
mod settings;

pub use operator::{Mode, ModeError, Operator};
pub use question::{CHOICE_COUNT, ChoiceSet, Question, QuestionError};
pub use session::{EndReason, ExportRecord, SessionSummary};
pub use settings::{MAX_REVEAL_MILLIS, QuizSettings, SettingsError};
