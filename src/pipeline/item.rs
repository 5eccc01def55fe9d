//! Work item abstraction for the pipeline.

/// A unit of work: the result-store slot it belongs to and the value to compute on.
///
/// Created once by the producer and consumed once by whichever consumer pops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkItem {
    position: usize,
    payload: u64,
}

impl WorkItem {
    pub fn new(position: usize, payload: u64) -> Self {
        Self { position, payload }
    }

    /// Index of the result slot this item owns.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn payload(&self) -> u64 {
        self.payload
    }
}

impl From<(usize, u64)> for WorkItem {
    fn from((position, payload): (usize, u64)) -> Self {
        Self::new(position, payload)
    }
}
