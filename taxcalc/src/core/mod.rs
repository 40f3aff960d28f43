//! Deterministic, pure tax logic.
//!
//! Core modules must be free of I/O side effects. They operate on plain
//! numbers and return deterministic outputs suitable for tests.

pub mod calculator;
pub mod schedule;
