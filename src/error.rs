//! Error taxonomy for the scheduling core.
//!
//! A task for which no GANG window can be found is recorded in the result's
//! `unscheduled` set and scheduling continues; it never produces an `Err`.
//! File and format errors belong to the CLI binary, which defines its own
//! error type for them.

use thiserror::Error;

/// Errors that can abort a scheduling call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed graph: {0}")]
    MalformedGraph(String),

    #[error("missing predecessor: task {task} has no recorded completion time when placing task {for_task}")]
    MissingPredecessor { task: usize, for_task: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
