use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeError {
    #[error("unknown quiz mode: {0}")]
    Unknown(String),
}

//
// ─── OPERATOR ──────────────────────────────────────────────────────────────────
//

/// One of the four arithmetic operations a question can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    /// Symbol shown between the operands.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    /// Human readable name of the operation.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Operator::Add => "Addition",
            Operator::Subtract => "Subtraction",
            Operator::Multiply => "Multiplication",
            Operator::Divide => "Division",
        }
    }

    /// Applies the operator to two operands.
    ///
    /// Returns `None` when the result is not a non-negative integer
    /// (negative difference, division by zero or a remainder).
    #[must_use]
    pub fn apply(self, a: u32, b: u32) -> Option<u32> {
        match self {
            Operator::Add => a.checked_add(b),
            Operator::Subtract => a.checked_sub(b),
            Operator::Multiply => a.checked_mul(b),
            Operator::Divide => {
                if b == 0 || a % b != 0 {
                    None
                } else {
                    Some(a / b)
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

/// Which operators a session draws its questions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "add")]
    Add,
    #[serde(rename = "sub", alias = "subtract")]
    Subtract,
    #[serde(rename = "mul", alias = "multiply")]
    Multiply,
    #[serde(rename = "div", alias = "divide")]
    Divide,
    #[default]
    #[serde(rename = "mixed")]
    Mixed,
}

impl Mode {
    /// The fixed operator for single-operator modes, `None` for `Mixed`.
    #[must_use]
    pub fn operator(self) -> Option<Operator> {
        match self {
            Mode::Add => Some(Operator::Add),
            Mode::Subtract => Some(Operator::Subtract),
            Mode::Multiply => Some(Operator::Multiply),
            Mode::Divide => Some(Operator::Divide),
            Mode::Mixed => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Add => "add",
            Mode::Subtract => "sub",
            Mode::Multiply => "mul",
            Mode::Divide => "div",
            Mode::Mixed => "mixed",
        }
    }
}

impl From<Operator> for Mode {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Add => Mode::Add,
            Operator::Subtract => Mode::Subtract,
            Operator::Multiply => Mode::Multiply,
            Operator::Divide => Mode::Divide,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" | "addition" => Ok(Mode::Add),
            "sub" | "subtract" | "subtraction" => Ok(Mode::Subtract),
            "mul" | "multiply" | "multiplication" => Ok(Mode::Multiply),
            "div" | "divide" | "division" => Ok(Mode::Divide),
            "mixed" => Ok(Mode::Mixed),
            _ => Err(ModeError::Unknown(s.to_owned())),
        }
    }
}
