//! Producer logic for the pipeline.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::item::WorkItem;
use crate::errors::Result;
use crate::metrics::MetricsCollector;
use crate::queue::SharedQueue;

/// Random delay inserted before each push to simulate variable production latency.
///
/// Owns its generator, so two `Jitter`s built from the same seed sleep identically.
#[derive(Debug, Clone)]
pub struct Jitter {
    rng: Option<StdRng>,
    max_delay: Duration,
    sleep_one_in: u32,
}

impl Jitter {
    /// Never sleeps.
    pub fn none() -> Self {
        Self {
            rng: None,
            max_delay: Duration::ZERO,
            sleep_one_in: 1,
        }
    }

    /// Skips the delay with probability `1 / sleep_one_in`, otherwise sleeps a
    /// uniform `1..=max_delay` whole milliseconds.
    pub fn seeded(seed: u64, max_delay: Duration, sleep_one_in: u32) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
            max_delay,
            sleep_one_in: sleep_one_in.max(1),
        }
    }

    /// Draws the next delay, or `None` when this push goes out immediately.
    pub fn next_delay(&mut self) -> Option<Duration> {
        let rng = self.rng.as_mut()?;
        if rng.gen_range(1..=self.sleep_one_in) == 1 {
            return None;
        }
        let max_ms = self.max_delay.as_millis().max(1) as u64;
        Some(Duration::from_millis(rng.gen_range(1..=max_ms)))
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::none()
    }
}

// Marks the queue finished even if the producer unwinds, so no consumer waits forever.
struct FinishOnDrop<'a>(&'a SharedQueue<WorkItem>);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.mark_finished();
    }
}

/// Producer thread body: pushes `items` in order, then signals the end of production.
///
/// Returns the number of items pushed.
pub fn produce(
    items: Vec<WorkItem>,
    queue: &SharedQueue<WorkItem>,
    mut jitter: Jitter,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
) -> Result<usize> {
    let finish = FinishOnDrop(queue);
    let mut produced = 0;

    for item in items {
        if let Some(delay) = jitter.next_delay() {
            thread::sleep(delay);
        }

        queue.push(item)?;
        metrics_collector.as_ref().map(|m| m.on_item_produced());
        produced += 1;

        tracing::debug!(
            position = item.position(),
            payload = item.payload(),
            "producer: new data"
        );
    }

    tracing::info!(produced, "producer: everything is produced, signalling the end");
    drop(finish);

    Ok(produced)
}
