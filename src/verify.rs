//! Checks over the results of a finished run.
//!
//! `check_fibonacci` mirrors the classic check: two base cases plus the recurrence
//! between neighbours. That alone does not catch a systematic error that keeps the
//! recurrence intact (every value doubled, say), so runs should also go through
//! `check_against`, which compares each slot with the workload's oracle.

use crate::errors::VerifyError;
use crate::schedule::Schedule;
use crate::workload::{checked_fibonacci, Workload};

/// Unwraps every slot, failing on the first one that was never written.
pub fn check_complete(results: &[Option<u64>]) -> Result<Vec<u64>, VerifyError> {
    results
        .iter()
        .enumerate()
        .map(|(position, slot)| slot.ok_or(VerifyError::MissingResult { position }))
        .collect()
}

/// Compares `values[i]` with `workload.expected(payload(i))` for every position.
pub fn check_against<W>(values: &[u64], schedule: &Schedule, workload: &W) -> Result<(), VerifyError>
where
    W: Workload + ?Sized,
{
    if values.len() != schedule.len() {
        return Err(VerifyError::LengthMismatch {
            expected: schedule.len(),
            actual: values.len(),
        });
    }

    for (position, payload) in schedule.payloads_by_position().into_iter().enumerate() {
        let expected = workload.expected(payload);
        let actual = values[position];
        if actual != expected {
            return Err(VerifyError::Mismatch {
                position,
                payload,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Checks `values[0] = fib(start)`, `values[1] = fib(start + 1)` and
/// `values[i-2] + values[i-1] = values[i]` for the rest.
pub fn check_fibonacci(values: &[u64], payload_start: u64) -> Result<(), VerifyError> {
    if values.len() < 2 {
        return Err(VerifyError::TooShort { len: values.len() });
    }

    for position in 0..2 {
        let n = payload_start.saturating_add(position as u64);
        let expected = checked_fibonacci(n).ok_or(VerifyError::OutOfRange { position, n })?;
        if values[position] != expected {
            return Err(VerifyError::BaseCase {
                position,
                n,
                expected,
                actual: values[position],
            });
        }
    }

    for (offset, w) in values.windows(3).enumerate() {
        if w[0].checked_add(w[1]) != Some(w[2]) {
            return Err(VerifyError::BrokenRecurrence {
                position: offset + 2,
                a: w[0],
                b: w[1],
                actual: w[2],
            });
        }
    }
    Ok(())
}
