use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use quiz_core::generator::RandomSource;
use quiz_core::model::{QuizSettings, SessionSummary, SettingsError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep};

use super::controller::{Round, RoundController, SessionId, SubmitOutcome};
use super::progress::SessionProgress;
use crate::error::SessionError;
use crate::high_score_service::HighScoreService;

const TICK_PERIOD: Duration = Duration::from_secs(1);

//
// ─── MESSAGES ──────────────────────────────────────────────────────────────────
//

/// Requests sent to a running quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizCommand {
    Start,
    Submit(u32),
    Stop,
    Configure(QuizSettings),
    Shutdown,
}

/// Everything the display layer needs to render the quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// A new question is on screen and accepts answers.
    Question {
        session: SessionId,
        round: Round,
        progress: SessionProgress,
    },
    /// One second of the countdown elapsed.
    Tick {
        session: SessionId,
        progress: SessionProgress,
    },
    /// An answer was accepted; the reveal interval starts unless the session ended.
    Answered {
        session: SessionId,
        outcome: SubmitOutcome,
        progress: SessionProgress,
    },
    /// The session is over and the high score, if beaten, has been persisted.
    Ended {
        session: SessionId,
        summary: SessionSummary,
    },
    /// `Start` was refused because the configuration is not playable.
    StartRejected(SettingsError),
}

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Caller-facing side of a running quiz. Cheap to clone.
#[derive(Debug, Clone)]
pub struct QuizHandle {
    commands: mpsc::UnboundedSender<QuizCommand>,
}

impl QuizHandle {
    /// # Errors
    ///
    /// Returns `SessionError::RunnerClosed` if the runner has stopped.
    pub fn send(&self, command: QuizCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .map_err(|_| SessionError::RunnerClosed)
    }

    /// # Errors
    ///
    /// Returns `SessionError::RunnerClosed` if the runner has stopped.
    pub fn start(&self) -> Result<(), SessionError> {
        self.send(QuizCommand::Start)
    }

    /// # Errors
    ///
    /// Returns `SessionError::RunnerClosed` if the runner has stopped.
    pub fn submit(&self, choice: u32) -> Result<(), SessionError> {
        self.send(QuizCommand::Submit(choice))
    }

    /// # Errors
    ///
    /// Returns `SessionError::RunnerClosed` if the runner has stopped.
    pub fn stop(&self) -> Result<(), SessionError> {
        self.send(QuizCommand::Stop)
    }

    /// # Errors
    ///
    /// Returns `SessionError::RunnerClosed` if the runner has stopped.
    pub fn configure(&self, settings: QuizSettings) -> Result<(), SessionError> {
        self.send(QuizCommand::Configure(settings))
    }

    /// # Errors
    ///
    /// Returns `SessionError::RunnerClosed` if the runner has stopped.
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.send(QuizCommand::Shutdown)
    }
}

/// A spawned runner: command handle, event stream and the task itself.
pub struct RunningQuiz {
    pub handle: QuizHandle,
    pub events: mpsc::UnboundedReceiver<QuizEvent>,
    pub task: JoinHandle<()>,
}

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

enum Wake {
    Command(Option<QuizCommand>),
    Tick,
    RevealElapsed,
}

/// Drives a `RoundController` with real timers on a single task.
///
/// The one-second countdown and the reveal pause are owned by the runner and
/// dropped whenever a session stops, restarts or ends, so no timer from an
/// earlier session can fire into a later one.
pub struct QuizLoopService<R> {
    controller: RoundController<R>,
    high_scores: HighScoreService,
    commands: mpsc::UnboundedReceiver<QuizCommand>,
    events: mpsc::UnboundedSender<QuizEvent>,
    ticker: Option<Interval>,
    reveal: Option<Pin<Box<Sleep>>>,
}

impl<R> QuizLoopService<R>
where
    R: RandomSource + Send + 'static,
{
    /// Load the stored high score and spawn the runner task.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::HighScore` if the high score cannot be loaded.
    pub async fn spawn(
        settings: QuizSettings,
        source: R,
        high_scores: HighScoreService,
    ) -> Result<RunningQuiz, SessionError> {
        let high_score = high_scores.load().await?;
        let controller = RoundController::new(settings, source).with_high_score(high_score);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let runner = Self {
            controller,
            high_scores,
            commands: command_rx,
            events: event_tx,
            ticker: None,
            reveal: None,
        };
        let task = tokio::spawn(runner.run());

        Ok(RunningQuiz {
            handle: QuizHandle {
                commands: command_tx,
            },
            events: event_rx,
            task,
        })
    }

    async fn run(mut self) {
        loop {
            let wake = tokio::select! {
                command = self.commands.recv() => Wake::Command(command),
                () = next_tick(&mut self.ticker) => Wake::Tick,
                () = reveal_elapsed(&mut self.reveal) => Wake::RevealElapsed,
            };

            match wake {
                Wake::Command(None | Some(QuizCommand::Shutdown)) => break,
                Wake::Command(Some(command)) => self.handle_command(command).await,
                Wake::Tick => self.handle_tick().await,
                Wake::RevealElapsed => self.handle_reveal(),
            }
        }

        self.cancel_timers();
        log::debug!("quiz runner shut down");
    }

    async fn handle_command(&mut self, command: QuizCommand) {
        match command {
            QuizCommand::Start => self.handle_start(),
            QuizCommand::Submit(choice) => self.handle_submit(choice).await,
            QuizCommand::Stop => {
                if let Some(summary) = self.controller.stop() {
                    self.finish(summary).await;
                }
            }
            QuizCommand::Configure(settings) => {
                log::debug!("settings updated: {settings:?}");
                self.controller.set_settings(settings);
            }
            QuizCommand::Shutdown => {}
        }
    }

    fn handle_start(&mut self) {
        let round = match self.controller.start().cloned() {
            Ok(round) => round,
            Err(SessionError::Settings(err)) => {
                log::warn!("refusing to start: {err}");
                self.emit(QuizEvent::StartRejected(err));
                return;
            }
            Err(err) => {
                log::warn!("refusing to start: {err}");
                return;
            }
        };

        self.cancel_timers();
        let mut ticker = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);

        self.emit(QuizEvent::Question {
            session: self.controller.session_id(),
            round,
            progress: self.controller.progress(),
        });
    }

    async fn handle_submit(&mut self, choice: u32) {
        let Some(outcome) = self.controller.submit(choice) else {
            log::debug!("ignoring answer {choice}: not accepting submissions");
            return;
        };

        self.emit(QuizEvent::Answered {
            session: self.controller.session_id(),
            outcome,
            progress: self.controller.progress(),
        });

        match outcome.ended {
            Some(summary) => self.finish(summary).await,
            None => {
                let reveal_millis = self.controller.settings().reveal_millis;
                let pause = Duration::from_millis(u64::from(reveal_millis));
                self.reveal = Some(Box::pin(tokio::time::sleep(pause)));
            }
        }
    }

    async fn handle_tick(&mut self) {
        let Some(tick) = self.controller.tick() else {
            self.ticker = None;
            return;
        };

        self.emit(QuizEvent::Tick {
            session: self.controller.session_id(),
            progress: self.controller.progress(),
        });

        if let Some(summary) = tick.ended {
            self.finish(summary).await;
        }
    }

    fn handle_reveal(&mut self) {
        self.reveal = None;
        let Some(round) = self.controller.finish_reveal().cloned() else {
            return;
        };
        self.emit(QuizEvent::Question {
            session: self.controller.session_id(),
            round,
            progress: self.controller.progress(),
        });
    }

    async fn finish(&mut self, summary: SessionSummary) {
        self.cancel_timers();

        if let Err(err) = self.high_scores.record(&summary).await {
            log::warn!("failed to persist high score {}: {err}", summary.high_score);
        }

        self.emit(QuizEvent::Ended {
            session: self.controller.session_id(),
            summary,
        });
    }

    fn cancel_timers(&mut self) {
        self.ticker = None;
        self.reveal = None;
    }

    fn emit(&self, event: QuizEvent) {
        if self.events.send(event).is_err() {
            log::debug!("event dropped: display has gone away");
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending::<()>().await,
    }
}

async fn reveal_elapsed(reveal: &mut Option<Pin<Box<Sleep>>>) {
    match reveal {
        Some(sleep) => sleep.as_mut().await,
        None => pending::<()>().await,
    }
}
