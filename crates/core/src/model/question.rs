use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Operator;

/// Number of candidate answers shown for every question.
pub const CHOICE_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("{a} {op} {b} has no exact non-negative integer result")]
    InexactResult { op: Operator, a: u32, b: u32 },

    #[error("choice set needs 4 values, got {len}")]
    WrongChoiceCount { len: usize },

    #[error("choice set contains duplicate value {0}")]
    DuplicateChoice(u32),

    #[error("choice set is missing the correct answer {0}")]
    MissingAnswer(u32),
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single arithmetic question together with its exact answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    operator: Operator,
    operand_a: u32,
    operand_b: u32,
    correct_answer: u32,
}

impl Question {
    /// Builds a question, computing the answer from the operands.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InexactResult` if the operation does not produce
    /// an exact non-negative integer.
    pub fn new(operator: Operator, operand_a: u32, operand_b: u32) -> Result<Self, QuestionError> {
        let correct_answer =
            operator
                .apply(operand_a, operand_b)
                .ok_or(QuestionError::InexactResult {
                    op: operator,
                    a: operand_a,
                    b: operand_b,
                })?;
        Ok(Self {
            operator,
            operand_a,
            operand_b,
            correct_answer,
        })
    }

    /// Generator-side constructor; operands are drawn so the result is exact.
    pub(crate) fn from_exact_parts(
        operator: Operator,
        operand_a: u32,
        operand_b: u32,
        correct_answer: u32,
    ) -> Self {
        debug_assert_eq!(operator.apply(operand_a, operand_b), Some(correct_answer));
        Self {
            operator,
            operand_a,
            operand_b,
            correct_answer,
        }
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn operand_a(&self) -> u32 {
        self.operand_a
    }

    #[must_use]
    pub fn operand_b(&self) -> u32 {
        self.operand_b
    }

    #[must_use]
    pub fn correct_answer(&self) -> u32 {
        self.correct_answer
    }

    #[must_use]
    pub fn is_correct(&self, choice: u32) -> bool {
        choice == self.correct_answer
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.operand_a,
            self.operator.symbol(),
            self.operand_b
        )
    }
}

//
// ─── CHOICES ───────────────────────────────────────────────────────────────────
//

/// The candidate answers for a question, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSet {
    values: [u32; CHOICE_COUNT],
}

impl ChoiceSet {
    /// Builds a choice set for `answer` from already ordered values.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the values are not exactly four distinct
    /// numbers including `answer`.
    pub fn new(values: &[u32], answer: u32) -> Result<Self, QuestionError> {
        let values: [u32; CHOICE_COUNT] = values
            .try_into()
            .map_err(|_| QuestionError::WrongChoiceCount { len: values.len() })?;

        for (idx, value) in values.iter().enumerate() {
            if values[..idx].contains(value) {
                return Err(QuestionError::DuplicateChoice(*value));
            }
        }
        if !values.contains(&answer) {
            return Err(QuestionError::MissingAnswer(answer));
        }

        Ok(Self { values })
    }

    pub(crate) fn from_distinct(values: [u32; CHOICE_COUNT]) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        self.values.contains(&value)
    }

    /// Display position of `value`, if it is one of the choices.
    #[must_use]
    pub fn position_of(&self, value: u32) -> Option<usize> {
        self.values.iter().position(|v| *v == value)
    }

    /// Value shown at a display position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied()
    }
}
