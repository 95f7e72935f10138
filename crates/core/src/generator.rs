//! Random arithmetic questions and their candidate answers.
//!
//! Generation is a pure function of the requested [`Mode`] and a
//! [`RandomSource`]. Any `rand` generator is a random source; tests use
//! [`ScriptedSource`] to pin the drawn numbers.

use std::collections::VecDeque;

use rand::{Rng, RngCore};

use crate::model::{CHOICE_COUNT, ChoiceSet, Mode, Operator, Question};

/// Distractor draws before switching to deterministic offsets.
pub const MAX_DISTRACTOR_DRAWS: u32 = 32;

/// First deterministic offset used once random draws are exhausted.
const FALLBACK_OFFSET: u32 = 8;

//
// ─── RANDOM SOURCE ─────────────────────────────────────────────────────────────
//

/// Supplies uniformly distributed integers.
pub trait RandomSource {
    /// Returns an integer in the inclusive range `[low, high]`.
    fn pick(&mut self, low: i64, high: i64) -> i64;
}

impl<R: RngCore> RandomSource for R {
    fn pick(&mut self, low: i64, high: i64) -> i64 {
        self.random_range(low..=high)
    }
}

/// Replays a fixed list of numbers.
///
/// Each value is clamped into the requested range; once the list runs out
/// every draw returns the lower bound.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    values: VecDeque<i64>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedSource {
    fn pick(&mut self, low: i64, high: i64) -> i64 {
        self.values
            .pop_front()
            .map_or(low, |value| value.clamp(low, high))
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// Generates a question and its shuffled choices for `mode`.
pub fn generate<S: RandomSource + ?Sized>(mode: Mode, source: &mut S) -> (Question, ChoiceSet) {
    let question = generate_question(mode, source);
    let choices = generate_choices(question.correct_answer(), source);
    (question, choices)
}

/// Generates a question for `mode`, picking the operator uniformly for `Mode::Mixed`.
pub fn generate_question<S: RandomSource + ?Sized>(mode: Mode, source: &mut S) -> Question {
    let operator = match mode.operator() {
        Some(op) => op,
        None => Operator::ALL[pick_index(source, Operator::ALL.len() - 1)],
    };

    let (a, b) = match operator {
        Operator::Add => (pick_u32(source, 1, 12), pick_u32(source, 1, 12)),
        Operator::Subtract => {
            let a = pick_u32(source, 1, 20);
            let b = pick_u32(source, 1, a.min(10));
            if b > a { (b, a) } else { (a, b) }
        }
        Operator::Multiply => (pick_u32(source, 1, 10), pick_u32(source, 1, 10)),
        Operator::Divide => {
            let b = pick_u32(source, 1, 10);
            let quotient = pick_u32(source, 1, 10);
            (b * quotient, b)
        }
    };

    let answer = match operator {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        Operator::Multiply => a * b,
        Operator::Divide => a / b,
    };
    Question::from_exact_parts(operator, a, b, answer)
}

//
// ─── CHOICES ───────────────────────────────────────────────────────────────────
//

/// Builds four distinct, non-negative choices around `answer` and shuffles them.
///
/// Distractors sit within ±3 of the answer. Negative candidates are reflected
/// to small positives and collisions escape to `answer + 4..=7`. After
/// `MAX_DISTRACTOR_DRAWS` draws the remaining slots are filled with
/// `answer + 8 + collisions`, stepping upward, so the loop always terminates.
pub fn generate_choices<S: RandomSource + ?Sized>(answer: u32, source: &mut S) -> ChoiceSet {
    let base = i64::from(answer);
    let mut values: Vec<u32> = Vec::with_capacity(CHOICE_COUNT);
    values.push(answer);

    let mut collisions = 0_u32;
    let mut draws = 0_u32;
    while values.len() < CHOICE_COUNT && draws < MAX_DISTRACTOR_DRAWS {
        draws += 1;

        let mut delta = source.pick(-3, 3);
        if delta == 0 {
            delta = if source.pick(0, 1) == 1 { 1 } else { -1 };
        }

        let mut candidate = base + delta;
        if candidate < 0 {
            candidate = candidate.abs() + source.pick(1, 2);
        }
        if values.contains(&to_choice(candidate)) {
            candidate = base + source.pick(4, 7);
        }

        let candidate = to_choice(candidate);
        if values.contains(&candidate) {
            collisions += 1;
        } else {
            values.push(candidate);
        }
    }

    let mut offset = FALLBACK_OFFSET + collisions;
    while values.len() < CHOICE_COUNT {
        let candidate = answer.wrapping_add(offset);
        if !values.contains(&candidate) {
            values.push(candidate);
        }
        offset = offset.wrapping_add(1);
    }

    let mut values = [values[0], values[1], values[2], values[3]];
    shuffle(&mut values, source);
    ChoiceSet::from_distinct(values)
}

/// Unbiased Fisher–Yates shuffle driven by `source`.
fn shuffle<S: RandomSource + ?Sized>(values: &mut [u32], source: &mut S) {
    for i in (1..values.len()).rev() {
        let j = pick_index(source, i);
        values.swap(i, j);
    }
}

fn pick_index<S: RandomSource + ?Sized>(source: &mut S, max: usize) -> usize {
    let high = i64::try_from(max).unwrap_or(i64::MAX);
    usize::try_from(source.pick(0, high)).map_or(0, |idx| idx.min(max))
}

fn pick_u32<S: RandomSource + ?Sized>(source: &mut S, low: u32, high: u32) -> u32 {
    let value = source.pick(i64::from(low), i64::from(high));
    u32::try_from(value).map_or(low, |v| v.clamp(low, high))
}

fn to_choice(candidate: i64) -> u32 {
    u32::try_from(candidate.max(0)).unwrap_or(u32::MAX)
}
