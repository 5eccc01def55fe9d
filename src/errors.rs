//! Error types for the pipeline.
//!
//! This module defines errors that may occur while building or running a pipeline,
//! and the errors reported when a finished run fails verification.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// Represents errors that can occur in the pipeline.
///
/// Most variants describe a broken precondition (bad configuration, a schedule
/// that is not a permutation) or a broken protocol invariant (a push after the
/// end of production, a result slot written twice). None of them are retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline was configured with zero consumers.
    #[error("pipeline needs at least one consumer")]
    NoConsumers,
    /// A run was requested with fewer items than the caller requires.
    #[error("schedule must contain at least {min} items, got {len}")]
    ScheduleTooShort { len: usize, min: usize },
    /// The producer would never sleep or always sleep; a ratio of zero is meaningless.
    #[error("sleep ratio must be at least 1, got {0}")]
    InvalidSleepRatio(u32),
    /// Payloads `start..start + len` leave the range the workload can compute.
    #[error("payloads {start}..{start}+{len} exceed the largest supported payload {max}")]
    PayloadOutOfRange { start: u64, len: usize, max: u64 },
    /// A position does not fit the result store.
    #[error("position {position} is out of range for {len} items")]
    PositionOutOfRange { position: usize, len: usize },
    /// A position was scheduled more than once.
    #[error("position {position} appears more than once in the schedule")]
    DuplicatePosition { position: usize },
    /// Production has been marked finished, and no new items can be accepted.
    #[error("queue is finished, no new items can be accepted")]
    QueueFinished,
    /// Two consumers tried to write the same result slot.
    #[error("result slot {position} was written more than once")]
    SlotAlreadyWritten { position: usize },
    /// The operating system refused to start a pipeline thread.
    #[error("failed to spawn {role} thread")]
    Spawn {
        role: &'static str,
        #[source]
        source: std::io::Error,
    },
    /// A producer or consumer thread panicked.
    #[error("a pipeline thread panicked or failed to join")]
    ThreadPanicked,
    /// The run finished but its results are wrong.
    #[error(transparent)]
    Verify(#[from] VerifyError),
}

/// Represents a failed check over the results of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// A slot was never written.
    #[error("no result was stored for position {position}")]
    MissingResult { position: usize },
    /// A slot holds a value the single-threaded oracle disagrees with.
    #[error("position {position}: compute({payload}) should be {expected}, found {actual}")]
    Mismatch {
        position: usize,
        payload: u64,
        expected: u64,
        actual: u64,
    },
    /// One of the first two Fibonacci results is wrong.
    #[error("position {position}: fib({n}) should be {expected}, found {actual}")]
    BaseCase {
        position: usize,
        n: u64,
        expected: u64,
        actual: u64,
    },
    /// Adjacent results do not satisfy `r[i-2] + r[i-1] == r[i]`.
    #[error("recurrence broken at position {position}: {a} + {b} != {actual}")]
    BrokenRecurrence {
        position: usize,
        a: u64,
        b: u64,
        actual: u64,
    },
    /// A base case lies beyond the largest Fibonacci number a `u64` holds.
    #[error("position {position}: fib({n}) does not fit in a u64")]
    OutOfRange { position: usize, n: u64 },
    /// The recurrence check needs at least two results.
    #[error("at least 2 results are needed to check the recurrence, got {len}")]
    TooShort { len: usize },
    /// The result count differs from the schedule length.
    #[error("expected {expected} results, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}
