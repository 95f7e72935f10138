use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Mode, QuizSettings};

/// Why a session left the active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    TimeExpired,
    OutOfLives,
    RoundCapReached,
    Stopped,
}

impl EndReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::TimeExpired => "time expired",
            EndReason::OutOfLives => "out of lives",
            EndReason::RoundCapReached => "round cap reached",
            EndReason::Stopped => "stopped",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final numbers of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u32,
    pub rounds_completed: u32,
    pub reason: EndReason,
    /// Best score after this session was taken into account.
    pub high_score: u32,
    /// True when this session beat the previous best.
    pub is_new_high_score: bool,
}

/// Serializable snapshot of a finished session, written as the result artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub date: DateTime<Utc>,
    pub score: u32,
    pub high_score: u32,
    pub rounds_completed: u32,
    pub mode: Mode,
    pub total_time_secs: u32,
}

impl ExportRecord {
    #[must_use]
    pub fn from_summary(
        summary: &SessionSummary,
        settings: &QuizSettings,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            score: summary.score,
            high_score: summary.high_score,
            rounds_completed: summary.rounds_completed,
            mode: settings.mode,
            total_time_secs: settings.total_time_secs,
        }
    }
}
