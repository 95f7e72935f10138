#![forbid(unsafe_code)]

//! Domain types and the pure question generator for the arithmetic quiz.

pub mod generator;
pub mod model;
pub mod time;

pub use time::Clock;
