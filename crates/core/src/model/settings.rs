use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Mode;

/// Upper bound for the post-answer reveal pause.
pub const MAX_REVEAL_MILLIS: u32 = 5_000;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("round cap must be > 0")]
    InvalidRoundCap,

    #[error("total time must be > 0 seconds")]
    InvalidTotalTime,

    #[error("initial lives must be > 0")]
    InvalidInitialLives,

    #[error("reveal interval must be at most {max} ms, got {provided}")]
    InvalidRevealInterval { provided: u32, max: u32 },
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Configuration for a quiz session.
///
/// Read once when a session starts. The fields are public so the binary can
/// fill them from flags or environment, and `validate` is the gate that keeps
/// a degenerate session (no rounds, no time, no lives) from ever starting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    pub mode: Mode,
    pub round_cap: u32,
    pub total_time_secs: u32,
    pub initial_lives: u32,
    pub reveal_millis: u32,
}

impl QuizSettings {
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_round_cap(mut self, round_cap: u32) -> Self {
        self.round_cap = round_cap;
        self
    }

    #[must_use]
    pub fn with_total_time_secs(mut self, total_time_secs: u32) -> Self {
        self.total_time_secs = total_time_secs;
        self
    }

    #[must_use]
    pub fn with_initial_lives(mut self, initial_lives: u32) -> Self {
        self.initial_lives = initial_lives;
        self
    }

    #[must_use]
    pub fn with_reveal_millis(mut self, reveal_millis: u32) -> Self {
        self.reveal_millis = reveal_millis;
        self
    }

    /// Checks that the settings describe a playable session.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for a zero round cap, total time or life count,
    /// or a reveal interval above `MAX_REVEAL_MILLIS`.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.round_cap == 0 {
            return Err(SettingsError::InvalidRoundCap);
        }
        if self.total_time_secs == 0 {
            return Err(SettingsError::InvalidTotalTime);
        }
        if self.initial_lives == 0 {
            return Err(SettingsError::InvalidInitialLives);
        }
        if self.reveal_millis > MAX_REVEAL_MILLIS {
            return Err(SettingsError::InvalidRevealInterval {
                provided: self.reveal_millis,
                max: MAX_REVEAL_MILLIS,
            });
        }
        Ok(())
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            mode: Mode::Mixed,
            round_cap: 10,
            total_time_secs: 60,
            initial_lives: 3,
            reveal_millis: 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_playable() {
        let settings = QuizSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.initial_lives, 3);
        assert_eq!(settings.total_time_secs, 60);
        assert_eq!(settings.reveal_millis, 400);
    }

    #[test]
    fn zero_values_are_rejected() {
        let base = QuizSettings::new(Mode::Add);
        assert_eq!(
            base.clone().with_round_cap(0).validate(),
            Err(SettingsError::InvalidRoundCap)
        );
        assert_eq!(
            base.clone().with_total_time_secs(0).validate(),
            Err(SettingsError::InvalidTotalTime)
        );
        assert_eq!(
            base.clone().with_initial_lives(0).validate(),
            Err(SettingsError::InvalidInitialLives)
        );
        assert!(base.with_reveal_millis(0).validate().is_ok());
    }

    #[test]
    fn long_reveal_is_rejected() {
        let err = QuizSettings::default()
            .with_reveal_millis(MAX_REVEAL_MILLIS + 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidRevealInterval { .. }));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: QuizSettings =
            serde_json::from_str(r#"{"mode":"div","round_cap":5}"#).unwrap();
        assert_eq!(settings.mode, Mode::Divide);
        assert_eq!(settings.round_cap, 5);
        assert_eq!(settings.total_time_secs, 60);
    }
}
