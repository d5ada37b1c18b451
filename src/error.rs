//! Crate-level error types

use thiserror::Error;

use crate::solvers::SolverError;

/// Errors raised while building systems, compiling inputs, or injecting values
#[derive(Error, Debug)]
pub enum Error {
    /// A variable handle was used with a system that does not own it.
    #[error("variable `{name}` does not exist in system `{system}`")]
    UnknownVariable { name: String, system: String },

    /// A live injection targeted a variable that was never declared as an input.
    #[error("input variable `{name}` is not registered with this bundle")]
    UnregisteredInput { name: String },

    /// An injection was attempted on a run whose system declared no inputs.
    #[error("system declared no input variables")]
    NoInputs,

    /// The system was handed to a problem before `compile` was called.
    #[error("system `{name}` has not been compiled")]
    NotCompiled { name: String },

    /// The system has no dynamics function.
    #[error("system `{name}` has no dynamics function")]
    NoDynamics { name: String },

    /// An input record's value and time sequences differ in length.
    #[error("record for `{name}` has {values} values but {times} times")]
    RecordLengthMismatch {
        name: String,
        values: usize,
        times: usize,
    },

    /// An input record's times are not in non-decreasing order.
    #[error("record times for `{name}` must be non-decreasing (t[{index}] = {time} breaks the order)")]
    DecreasingTimes {
        name: String,
        index: usize,
        time: f64,
    },

    /// An input record contains a NaN or infinite time.
    #[error("record for `{name}` has a non-finite time at index {index}")]
    NonFiniteTime { name: String, index: usize },

    /// An input record contains a time before the start of the run span.
    #[error("record for `{name}` has time {time} before the run start {start}")]
    TimeBeforeSpan { name: String, time: f64, start: f64 },

    /// The integration span is empty or reversed.
    #[error("time span must be increasing (start = {start}, end = {end})")]
    BadSpan { start: f64, end: f64 },

    /// A numeric stepping failure, passed through unmodified.
    #[error(transparent)]
    Solver(#[from] SolverError),
}
