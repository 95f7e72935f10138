use std::fmt;

use quiz_core::generator::{self, RandomSource};
use quiz_core::model::{ChoiceSet, EndReason, Question, QuizSettings, SessionSummary};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── IDENTIFIERS & PHASES ──────────────────────────────────────────────────────
//

/// Identifies one started session. Every `start()` hands out a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the controller: `Idle → Active → Ended`, restartable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    Ended(EndReason),
}

//
// ─── ROUNDS & OUTCOMES ─────────────────────────────────────────────────────────
//

/// The question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    /// 1-based position of this question within the session.
    pub number: u32,
    pub question: Question,
    pub choices: ChoiceSet,
}

/// Result of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub chosen: u32,
    pub correct_answer: u32,
    pub correct: bool,
    /// Set when this answer ended the session (out of lives or round cap).
    pub ended: Option<SessionSummary>,
}

/// Result of an accepted countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub time_remaining_secs: u32,
    pub ended: Option<SessionSummary>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SessionState {
    score: u32,
    lives_remaining: u32,
    rounds_completed: u32,
    time_remaining_secs: u32,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Owns the state of a quiz session and applies the scoring rules.
///
/// The controller is synchronous and knows nothing about timers: the caller
/// invokes `tick()` once per second while the session is active and
/// `finish_reveal()` once the post-answer reveal interval has elapsed.
/// Events that arrive in the wrong phase (late clicks, ticks after the end,
/// answers during the reveal) are ignored and return `None`.
pub struct RoundController<R> {
    settings: QuizSettings,
    pending_settings: Option<QuizSettings>,
    source: R,
    phase: SessionPhase,
    state: SessionState,
    round: Option<Round>,
    revealing: bool,
    high_score: u32,
    session_id: SessionId,
    summary: Option<SessionSummary>,
}

impl<R: RandomSource> RoundController<R> {
    #[must_use]
    pub fn new(settings: QuizSettings, source: R) -> Self {
        Self {
            settings,
            pending_settings: None,
            source,
            phase: SessionPhase::Idle,
            state: SessionState::default(),
            round: None,
            revealing: false,
            high_score: 0,
            session_id: SessionId::default(),
            summary: None,
        }
    }

    /// Seed the best score known from storage.
    #[must_use]
    pub fn with_high_score(mut self, high_score: u32) -> Self {
        self.high_score = high_score;
        self
    }

    /// Settings of the running session, or of the next one when idle.
    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Replace the configuration. A running session keeps its settings; the
    /// new ones apply from the next `start()`.
    pub fn set_settings(&mut self, settings: QuizSettings) {
        if self.is_active() {
            self.pending_settings = Some(settings);
        } else {
            self.pending_settings = None;
            self.settings = settings;
        }
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn set_high_score(&mut self, high_score: u32) {
        self.high_score = high_score;
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// True between an accepted answer and `finish_reveal()`.
    #[must_use]
    pub fn is_revealing(&self) -> bool {
        self.is_active() && self.revealing
    }

    #[must_use]
    pub fn accepts_submissions(&self) -> bool {
        self.is_active() && !self.revealing
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn current_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Summary of the most recently ended session.
    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.state.score
    }

    #[must_use]
    pub fn lives_remaining(&self) -> u32 {
        self.state.lives_remaining
    }

    #[must_use]
    pub fn rounds_completed(&self) -> u32 {
        self.state.rounds_completed
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        self.state.time_remaining_secs
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            score: self.state.score,
            high_score: self.high_score,
            lives_remaining: self.state.lives_remaining,
            rounds_completed: self.state.rounds_completed,
            round_cap: self.settings.round_cap,
            time_remaining_secs: self.state.time_remaining_secs,
            total_time_secs: self.settings.total_time_secs,
        }
    }

    /// Elapsed share of the countdown, `0..=100`.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        self.progress().percent_elapsed()
    }

    /// Begin a fresh session, from any phase.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Settings` if the configuration cannot produce a
    /// playable session; the controller is left untouched in that case.
    pub fn start(&mut self) -> Result<&Round, SessionError> {
        self.pending_settings
            .as_ref()
            .unwrap_or(&self.settings)
            .validate()?;
        if let Some(settings) = self.pending_settings.take() {
            self.settings = settings;
        }

        self.session_id = SessionId(self.session_id.0 + 1);
        self.state = SessionState {
            score: 0,
            lives_remaining: self.settings.initial_lives,
            rounds_completed: 0,
            time_remaining_secs: self.settings.total_time_secs,
        };
        self.revealing = false;
        self.summary = None;
        self.phase = SessionPhase::Active;
        log::debug!(
            "session {} started: mode={} cap={} time={}s lives={}",
            self.session_id,
            self.settings.mode,
            self.settings.round_cap,
            self.settings.total_time_secs,
            self.settings.initial_lives
        );

        Ok(self.next_round())
    }

    /// Count down one second.
    ///
    /// Returns `None` if the session is not active.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.is_active() {
            return None;
        }

        self.state.time_remaining_secs = self.state.time_remaining_secs.saturating_sub(1);
        let ended = if self.state.time_remaining_secs == 0 {
            Some(self.end(EndReason::TimeExpired))
        } else {
            None
        };

        Some(TickOutcome {
            time_remaining_secs: self.state.time_remaining_secs,
            ended,
        })
    }

    /// Answer the current question.
    ///
    /// A correct answer scores a point, a wrong one costs a life. Running out
    /// of lives ends the session before the round cap is considered. If the
    /// session continues, submissions are refused until `finish_reveal()`.
    ///
    /// Returns `None` if the session is not active or a reveal is pending.
    pub fn submit(&mut self, choice: u32) -> Option<SubmitOutcome> {
        if !self.accepts_submissions() {
            return None;
        }
        let question = &self.round.as_ref()?.question;
        let correct_answer = question.correct_answer();
        let correct = question.is_correct(choice);

        if correct {
            self.state.score += 1;
        } else {
            self.state.lives_remaining = self.state.lives_remaining.saturating_sub(1);
        }
        self.state.rounds_completed += 1;

        let ended = if self.state.lives_remaining == 0 {
            Some(self.end(EndReason::OutOfLives))
        } else if self.state.rounds_completed >= self.settings.round_cap {
            Some(self.end(EndReason::RoundCapReached))
        } else {
            self.revealing = true;
            None
        };

        Some(SubmitOutcome {
            chosen: choice,
            correct_answer,
            correct,
            ended,
        })
    }

    /// Close the reveal interval and present the next question.
    ///
    /// Returns `None` if no reveal is pending (e.g. the session ended meanwhile).
    pub fn finish_reveal(&mut self) -> Option<&Round> {
        if !self.is_revealing() {
            return None;
        }
        self.revealing = false;
        Some(self.next_round())
    }

    /// End the session on request.
    ///
    /// Returns `None` if the session is not active.
    pub fn stop(&mut self) -> Option<SessionSummary> {
        if !self.is_active() {
            return None;
        }
        Some(self.end(EndReason::Stopped))
    }

    fn next_round(&mut self) -> &Round {
        let (question, choices) = generator::generate(self.settings.mode, &mut self.source);
        let number = self.state.rounds_completed + 1;
        self.round.insert(Round {
            number,
            question,
            choices,
        })
    }

    fn end(&mut self, reason: EndReason) -> SessionSummary {
        self.phase = SessionPhase::Ended(reason);
        self.revealing = false;

        let is_new_high_score = self.state.score > self.high_score;
        if is_new_high_score {
            self.high_score = self.state.score;
        }

        let summary = SessionSummary {
            score: self.state.score,
            rounds_completed: self.state.rounds_completed,
            reason,
            high_score: self.high_score,
            is_new_high_score,
        };
        self.summary = Some(summary);
        log::info!(
            "session {} ended ({reason}): score={} rounds={} high={}",
            self.session_id,
            summary.score,
            summary.rounds_completed,
            summary.high_score
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::generator::ScriptedSource;
    use quiz_core::model::{Mode, SettingsError};

    // An empty script always draws the lower bound: every add question is 1 + 1.
    fn controller(settings: QuizSettings) -> RoundController<ScriptedSource> {
        RoundController::new(settings, ScriptedSource::default())
    }

    fn add_settings() -> QuizSettings {
        QuizSettings::new(Mode::Add)
    }

    fn wrong_choice(ctrl: &RoundController<ScriptedSource>) -> u32 {
        let round = ctrl.current_round().unwrap();
        let answer = round.question.correct_answer();
        round
            .choices
            .values()
            .iter()
            .copied()
            .find(|v| *v != answer)
            .unwrap()
    }

    fn answer(ctrl: &RoundController<ScriptedSource>) -> u32 {
        ctrl.current_round().unwrap().question.correct_answer()
    }

    #[test]
    fn new_controller_is_idle_and_ignores_events() {
        let mut ctrl = controller(add_settings());
        assert_eq!(ctrl.phase(), SessionPhase::Idle);
        assert!(ctrl.tick().is_none());
        assert!(ctrl.submit(2).is_none());
        assert!(ctrl.stop().is_none());
        assert!(ctrl.finish_reveal().is_none());
    }

    #[test]
    fn start_resets_state_and_presents_question() {
        let mut ctrl = controller(add_settings().with_initial_lives(5).with_total_time_secs(30));
        let round = ctrl.start().unwrap();
        assert_eq!(round.number, 1);
        assert_eq!(round.question.to_string(), "1 + 1");

        assert!(ctrl.is_active());
        assert_eq!(ctrl.score(), 0);
        assert_eq!(ctrl.lives_remaining(), 5);
        assert_eq!(ctrl.rounds_completed(), 0);
        assert_eq!(ctrl.time_remaining_secs(), 30);
    }

    #[test]
    fn scripted_add_question_scores_on_correct_answer() {
        let mut ctrl = RoundController::new(add_settings(), ScriptedSource::new([3, 4]));
        let round = ctrl.start().unwrap();
        assert_eq!(round.question.to_string(), "3 + 4");
        assert_eq!(round.question.correct_answer(), 7);

        let outcome = ctrl.submit(7).unwrap();
        assert!(outcome.correct);
        assert!(outcome.ended.is_none());
        assert_eq!(ctrl.score(), 1);
        assert_eq!(ctrl.rounds_completed(), 1);
        assert_eq!(ctrl.lives_remaining(), 3);
        assert!(ctrl.is_active());
    }

    #[test]
    fn submissions_are_refused_during_reveal() {
        let mut ctrl = controller(add_settings());
        ctrl.start().unwrap();

        assert!(ctrl.submit(2).is_some());
        assert!(ctrl.is_revealing());
        assert!(ctrl.submit(2).is_none());
        assert_eq!(ctrl.score(), 1);

        let round = ctrl.finish_reveal().unwrap();
        assert_eq!(round.number, 2);
        assert!(ctrl.accepts_submissions());
        assert!(ctrl.finish_reveal().is_none());
    }

    #[test]
    fn three_wrong_answers_end_the_session() {
        let mut ctrl = controller(add_settings());
        ctrl.start().unwrap();

        for remaining in [2, 1] {
            let wrong = wrong_choice(&ctrl);
            let outcome = ctrl.submit(wrong).unwrap();
            assert!(!outcome.correct);
            assert_eq!(outcome.correct_answer, 2);
            assert_eq!(ctrl.lives_remaining(), remaining);
            ctrl.finish_reveal().unwrap();
        }

        let wrong = wrong_choice(&ctrl);
        let summary = ctrl.submit(wrong).unwrap().ended.unwrap();
        assert_eq!(summary.reason, EndReason::OutOfLives);
        assert_eq!(ctrl.phase(), SessionPhase::Ended(EndReason::OutOfLives));
        assert_eq!(ctrl.lives_remaining(), 0);
        assert_eq!(ctrl.time_remaining_secs(), 60);
    }

    #[test]
    fn losing_last_life_wins_over_round_cap() {
        let mut ctrl = controller(add_settings().with_initial_lives(1).with_round_cap(1));
        ctrl.start().unwrap();
        let wrong = wrong_choice(&ctrl);
        let summary = ctrl.submit(wrong).unwrap().ended.unwrap();
        assert_eq!(summary.reason, EndReason::OutOfLives);
    }

    #[test]
    fn round_cap_ends_after_last_answer() {
        let mut ctrl = controller(add_settings().with_round_cap(5));
        ctrl.start().unwrap();

        for _ in 0..4 {
            let outcome = ctrl.submit(answer(&ctrl)).unwrap();
            assert!(outcome.ended.is_none());
            ctrl.finish_reveal().unwrap();
        }

        let summary = ctrl.submit(answer(&ctrl)).unwrap().ended.unwrap();
        assert_eq!(summary.reason, EndReason::RoundCapReached);
        assert_eq!(summary.score, 5);
        assert_eq!(summary.rounds_completed, 5);
        assert!(!ctrl.is_active());
    }

    #[test]
    fn countdown_expires_the_session() {
        let mut ctrl = controller(add_settings());
        ctrl.start().unwrap();

        for _ in 0..59 {
            let tick = ctrl.tick().unwrap();
            assert!(tick.ended.is_none());
        }
        let last = ctrl.tick().unwrap();
        assert_eq!(last.time_remaining_secs, 0);
        let summary = last.ended.unwrap();
        assert_eq!(summary.reason, EndReason::TimeExpired);
        assert_eq!(summary.score, 0);

        assert!(ctrl.tick().is_none());
        assert!(ctrl.submit(2).is_none());
    }

    #[test]
    fn ticks_continue_during_reveal() {
        let mut ctrl = controller(add_settings().with_total_time_secs(2));
        ctrl.start().unwrap();
        ctrl.submit(2).unwrap();

        ctrl.tick().unwrap();
        let summary = ctrl.tick().unwrap().ended.unwrap();
        assert_eq!(summary.reason, EndReason::TimeExpired);
        assert_eq!(summary.score, 1);
        assert!(ctrl.finish_reveal().is_none());
    }

    #[test]
    fn stop_ends_with_stopped_reason() {
        let mut ctrl = controller(add_settings());
        ctrl.start().unwrap();
        ctrl.submit(2).unwrap();

        let summary = ctrl.stop().unwrap();
        assert_eq!(summary.reason, EndReason::Stopped);
        assert_eq!(summary.score, 1);
        assert!(ctrl.stop().is_none());
        assert_eq!(ctrl.summary(), Some(&summary));
    }

    #[test]
    fn restart_from_ended_resets_everything() {
        let mut ctrl = controller(add_settings().with_round_cap(2));
        ctrl.start().unwrap();
        ctrl.submit(2).unwrap();
        ctrl.finish_reveal().unwrap();
        ctrl.submit(wrong_choice(&ctrl)).unwrap();
        assert!(!ctrl.is_active());
        let first_id = ctrl.session_id();

        ctrl.start().unwrap();
        ctrl.start().unwrap();

        assert!(ctrl.is_active());
        assert!(ctrl.session_id() > first_id);
        assert_eq!(ctrl.score(), 0);
        assert_eq!(ctrl.lives_remaining(), 3);
        assert_eq!(ctrl.rounds_completed(), 0);
        assert_eq!(ctrl.time_remaining_secs(), 60);
        assert!(ctrl.summary().is_none());
        assert_eq!(ctrl.current_round().unwrap().number, 1);
    }

    #[test]
    fn invalid_settings_reject_start() {
        let mut ctrl = controller(add_settings().with_round_cap(0));
        let err = ctrl.start().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Settings(SettingsError::InvalidRoundCap)
        ));
        assert_eq!(ctrl.phase(), SessionPhase::Idle);
        assert!(ctrl.current_round().is_none());
    }

    #[test]
    fn settings_changed_mid_session_apply_on_restart() {
        let mut ctrl = controller(add_settings().with_round_cap(5));
        ctrl.start().unwrap();
        ctrl.set_settings(add_settings().with_round_cap(1).with_total_time_secs(20));

        let outcome = ctrl.submit(2).unwrap();
        assert!(outcome.ended.is_none());
        assert_eq!(ctrl.settings().round_cap, 5);

        ctrl.start().unwrap();
        assert_eq!(ctrl.settings().round_cap, 1);
        assert_eq!(ctrl.time_remaining_secs(), 20);
    }

    #[test]
    fn beating_high_score_updates_it_at_the_end() {
        let mut ctrl = controller(add_settings().with_round_cap(2)).with_high_score(1);
        ctrl.start().unwrap();
        ctrl.submit(2).unwrap();
        ctrl.finish_reveal().unwrap();
        assert_eq!(ctrl.high_score(), 1);

        let summary = ctrl.submit(2).unwrap().ended.unwrap();
        assert!(summary.is_new_high_score);
        assert_eq!(summary.high_score, 2);
        assert_eq!(ctrl.high_score(), 2);
    }

    #[test]
    fn tying_high_score_is_not_a_new_record() {
        let mut ctrl = controller(add_settings()).with_high_score(1);
        ctrl.start().unwrap();
        ctrl.submit(2).unwrap();
        let summary = ctrl.stop().unwrap();
        assert!(!summary.is_new_high_score);
        assert_eq!(summary.high_score, 1);
    }

    #[test]
    fn progress_reflects_state() {
        let mut ctrl = controller(add_settings().with_total_time_secs(10)).with_high_score(4);
        ctrl.start().unwrap();
        ctrl.tick().unwrap();
        ctrl.submit(2).unwrap();

        let progress = ctrl.progress();
        assert_eq!(progress.score, 1);
        assert_eq!(progress.high_score, 4);
        assert_eq!(progress.time_remaining_secs, 9);
        assert_eq!(progress.percent_elapsed(), 10);
        assert_eq!(ctrl.progress_percent(), 10);
    }
}
