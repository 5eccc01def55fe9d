//! Position-indexed result storage.
//!
//! Each slot is owned by whichever consumer dequeues the item with that position,
//! so writes need no lock. Slots are write-once cells: a second write is reported
//! instead of silently overwriting.

use std::sync::OnceLock;

use crossbeam::utils::CachePadded;

use crate::errors::{PipelineError, Result};

/// Fixed-length array of write-once result slots, sized before any thread starts.
pub struct ResultStore {
    // Padded so consumers writing neighbouring slots do not share cache lines.
    slots: Vec<CachePadded<OnceLock<u64>>>,
}

impl ResultStore {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| CachePadded::new(OnceLock::new())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Stores `value` in slot `position`.
    ///
    /// # Errors
    /// [`PipelineError::PositionOutOfRange`] if the slot does not exist,
    /// [`PipelineError::SlotAlreadyWritten`] if it already holds a value.
    pub fn write(&self, position: usize, value: u64) -> Result<()> {
        let slot = self
            .slots
            .get(position)
            .ok_or(PipelineError::PositionOutOfRange {
                position,
                len: self.slots.len(),
            })?;
        slot.set(value)
            .map_err(|_| PipelineError::SlotAlreadyWritten { position })
    }

    pub fn get(&self, position: usize) -> Option<u64> {
        self.slots.get(position).and_then(|slot| slot.get().copied())
    }

    /// Number of slots written so far.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }

    pub fn into_results(self) -> Vec<Option<u64>> {
        self.slots
            .into_iter()
            .map(|slot| slot.into_inner().into_inner())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_once() {
        let store = ResultStore::new(3);
        store.write(1, 42).unwrap();

        assert_eq!(store.get(1), Some(42));
        assert_eq!(store.get(0), None);
        assert_eq!(store.filled(), 1);

        assert!(matches!(
            store.write(1, 43),
            Err(PipelineError::SlotAlreadyWritten { position: 1 })
        ));
        // The first value survives.
        assert_eq!(store.get(1), Some(42));
    }

    #[test]
    fn test_out_of_range() {
        let store = ResultStore::new(2);
        assert!(matches!(
            store.write(2, 0),
            Err(PipelineError::PositionOutOfRange { position: 2, len: 2 })
        ));
        assert_eq!(store.get(5), None);
    }

    #[test]
    fn test_into_results() {
        let store = ResultStore::new(3);
        store.write(0, 1).unwrap();
        store.write(2, 3).unwrap();
        assert_eq!(store.into_results(), vec![Some(1), None, Some(3)]);
    }

    #[test]
    fn test_concurrent_disjoint_writes() {
        let store = ResultStore::new(64);
        std::thread::scope(|s| {
            for t in 0..4 {
                let store = &store;
                s.spawn(move || {
                    for pos in (t..64).step_by(4) {
                        store.write(pos, pos as u64 * 10).unwrap();
                    }
                });
            }
        });
        assert_eq!(store.filled(), 64);
        assert_eq!(store.get(63), Some(630));
    }
}
