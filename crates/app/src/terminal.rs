//! Line-oriented rendering of quiz events and parsing of typed answers.

use std::io::BufRead;

use quiz_core::model::{QuizSettings, SessionSummary};
use services::{QuizEvent, Round, SessionProgress, SubmitOutcome};
use tokio::sync::mpsc;

const CHOICE_LABELS: [char; 4] = ['a', 'b', 'c', 'd'];

/// What a typed line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Answer(u32),
    Quit,
    Again,
    Unknown,
}

/// Interpret a line: a letter picks a choice by position, a number is taken
/// as the answer value itself.
pub fn parse_input(line: &str, round: Option<&Round>) -> Input {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "q" | "quit" | "stop" => return Input::Quit,
        "" | "r" | "again" => return Input::Again,
        _ => {}
    }

    if let Ok(value) = trimmed.parse::<u32>() {
        return Input::Answer(value);
    }

    let mut chars = trimmed.chars();
    if let (Some(label), None) = (chars.next(), chars.next()) {
        let index = CHOICE_LABELS
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(&label));
        if let Some(value) = index.and_then(|i| round.and_then(|r| r.choices.get(i))) {
            return Input::Answer(value);
        }
    }

    Input::Unknown
}

/// Forward stdin lines to the async side.
///
/// Runs on a plain thread: a blocked read must not hold up runtime shutdown.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

pub fn print_intro(settings: &QuizSettings) {
    println!(
        "Quick math: {} | {} rounds | {}s | {} lives",
        settings.mode, settings.round_cap, settings.total_time_secs, settings.initial_lives
    );
    println!("Answer with a-d or the number itself. q stops the round.");
}

pub fn print_hint(in_round: bool) {
    if in_round {
        println!("type a-d, a number, or q to stop");
    } else {
        println!("press enter to play again, q to quit");
    }
}

pub fn render(event: &QuizEvent) {
    match event {
        QuizEvent::Question {
            round, progress, ..
        } => render_question(round, progress),
        QuizEvent::Tick { progress, .. } => render_tick(progress),
        QuizEvent::Answered {
            outcome, progress, ..
        } => render_answer(outcome, progress),
        QuizEvent::Ended { summary, .. } => render_end(summary),
        QuizEvent::StartRejected(err) => eprintln!("cannot start: {err}"),
    }
}

fn render_question(round: &Round, progress: &SessionProgress) {
    println!();
    println!("{}", question_line(round, progress));
    println!("  {}", choices_line(round));
}

fn question_line(round: &Round, progress: &SessionProgress) -> String {
    format!(
        "Q{}/{}  {}: {} = ?    score {}  best {}  lives {}  {}s",
        round.number,
        progress.round_cap,
        round.question.operator().label(),
        round.question,
        progress.score,
        progress.high_score,
        progress.lives_remaining,
        progress.time_remaining_secs
    )
}

fn choices_line(round: &Round) -> String {
    let choices: Vec<String> = CHOICE_LABELS
        .iter()
        .zip(round.choices.values())
        .map(|(label, value)| format!("{label}) {value}"))
        .collect();
    choices.join("   ")
}

fn render_tick(progress: &SessionProgress) {
    let remaining = progress.time_remaining_secs;
    if remaining > 0 && (remaining <= 5 || remaining % 10 == 0) {
        println!("  {remaining}s left ({}% gone)", progress.percent_elapsed());
    }
}

fn render_answer(outcome: &SubmitOutcome, progress: &SessionProgress) {
    if outcome.correct {
        println!("  ✔ {} is right", outcome.chosen);
    } else {
        println!(
            "  ✘ {} is wrong, it was {} ({} lives left)",
            outcome.chosen, outcome.correct_answer, progress.lives_remaining
        );
    }
}

fn render_end(summary: &SessionSummary) {
    println!();
    println!(
        "Round over ({}): score {} in {} answers, best {}",
        summary.reason, summary.score, summary.rounds_completed, summary.high_score
    );
    if summary.is_new_high_score {
        println!("New high score!");
    }
    print_hint(false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{ChoiceSet, Operator, Question};

    fn round() -> Round {
        Round {
            number: 1,
            question: Question::new(Operator::Add, 3, 4).unwrap(),
            choices: ChoiceSet::new(&[9, 7, 6, 8], 7).unwrap(),
        }
    }

    #[test]
    fn letters_pick_by_position() {
        let round = round();
        assert_eq!(parse_input("a", Some(&round)), Input::Answer(9));
        assert_eq!(parse_input(" B \n", Some(&round)), Input::Answer(7));
        assert_eq!(parse_input("d", Some(&round)), Input::Answer(8));
        assert_eq!(parse_input("e", Some(&round)), Input::Unknown);
        assert_eq!(parse_input("a", None), Input::Unknown);
    }

    #[test]
    fn numbers_are_answer_values() {
        assert_eq!(parse_input("7", Some(&round())), Input::Answer(7));
        assert_eq!(parse_input("42", None), Input::Answer(42));
    }

    #[test]
    fn question_line_names_the_operation() {
        let progress = SessionProgress {
            score: 2,
            high_score: 5,
            lives_remaining: 3,
            rounds_completed: 2,
            round_cap: 10,
            time_remaining_secs: 41,
            total_time_secs: 60,
        };
        let line = question_line(&round(), &progress);
        assert!(line.starts_with("Q1/10  Addition: 3 + 4 = ?"));
        assert!(line.ends_with("41s"));
        assert_eq!(choices_line(&round()), "a) 9   b) 7   c) 6   d) 8");
    }

    #[test]
    fn control_words() {
        assert_eq!(parse_input("q", None), Input::Quit);
        assert_eq!(parse_input("Quit", None), Input::Quit);
        assert_eq!(parse_input("", None), Input::Again);
        assert_eq!(parse_input("again", None), Input::Again);
        assert_eq!(parse_input("maybe", None), Input::Unknown);
    }
}
