//! Work generation: the ordered list of items the producer emits.
//!
//! Positions always form a permutation of `0..len`; the order of the list is
//! the production order.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::errors::{PipelineError, Result};
use crate::pipeline::item::WorkItem;

/// An ordered, validated sequence of work items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    items: Vec<WorkItem>,
}

impl Schedule {
    /// Positions `0..len` in order, with payload `payload_start + position`.
    ///
    /// `payload_start + len` must fit in a `u64`; [`PipelineConfig::validate`](crate::PipelineConfig::validate)
    /// rejects configurations where it does not.
    pub fn sequential(len: usize, payload_start: u64) -> Self {
        let items = (0..len)
            .map(|pos| WorkItem::new(pos, payload_start + pos as u64))
            .collect();
        Self { items }
    }

    /// Same items as [`sequential`](Self::sequential), permuted with `rng`.
    pub fn shuffled<R: Rng + ?Sized>(len: usize, payload_start: u64, rng: &mut R) -> Self {
        let mut schedule = Self::sequential(len, payload_start);
        schedule.items.shuffle(rng);
        schedule
    }

    /// Builds a schedule from `(position, payload)` pairs in production order.
    ///
    /// # Errors
    /// Fails unless the positions are exactly a permutation of `0..pairs.len()`.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, u64)>,
    {
        let items: Vec<WorkItem> = pairs.into_iter().map(WorkItem::from).collect();
        let len = items.len();
        let mut seen = HashSet::with_capacity(len);

        for item in &items {
            if item.position() >= len {
                return Err(PipelineError::PositionOutOfRange {
                    position: item.position(),
                    len,
                });
            }
            if !seen.insert(item.position()) {
                return Err(PipelineError::DuplicatePosition {
                    position: item.position(),
                });
            }
        }

        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    /// Payload scheduled for `position`, if any.
    pub fn payload_of(&self, position: usize) -> Option<u64> {
        self.items
            .iter()
            .find(|item| item.position() == position)
            .map(WorkItem::payload)
    }

    /// Payloads indexed by position rather than production order.
    pub fn payloads_by_position(&self) -> Vec<u64> {
        let mut payloads = vec![0; self.items.len()];
        for item in &self.items {
            payloads[item.position()] = item.payload();
        }
        payloads
    }

    /// The same items produced in the opposite order.
    pub fn reversed(&self) -> Self {
        let mut items = self.items.clone();
        items.reverse();
        Self { items }
    }

    pub(crate) fn into_items(self) -> Vec<WorkItem> {
        self.items
    }
}
