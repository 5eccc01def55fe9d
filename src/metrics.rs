//! Metrics collection for the pipeline.
//!
//! This module defines the `MetricsCollector` trait for observing pipeline activity,
//! as well as a default implementation backed by atomic counters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A trait for collecting metrics from a pipeline run.
///
/// Hooks are called from the producer and consumer threads, outside the queue lock.
pub trait MetricsCollector: Send + Sync {
    /// Called by the producer once an item has been pushed.
    fn on_item_produced(&self);
    /// Called when a consumer has popped an item and starts computing.
    fn on_item_started(&self);
    /// Called when a consumer has stored an item's result.
    fn on_item_completed(&self);
    /// Called when a consumer thread enters its loop.
    fn on_consumer_started(&self);
    /// Called when a consumer thread observes the done signal.
    fn on_consumer_stopped(&self);
}

/// Stores metrics for the pipeline using atomic counters.
///
/// The `PipelineMetrics` struct tracks the following:
/// - `produced_items`: Total number of items the producer has emitted.
/// - `queued_items`: Number of items waiting in the queue.
/// - `running_items`: Number of items currently being computed.
/// - `completed_items`: Total number of results stored.
/// - `active_consumers`: Number of consumer threads currently in their loop.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    pub produced_items: AtomicUsize,
    pub queued_items: AtomicUsize,
    pub running_items: AtomicUsize,
    pub completed_items: AtomicUsize,
    pub active_consumers: AtomicUsize,
}

impl PipelineMetrics {
    /// Creates a new `PipelineMetrics` instance with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A default implementation of `MetricsCollector` using atomic counters.
///
/// Backed by an `Arc<PipelineMetrics>` so the caller keeps a handle for reading.
pub struct AtomicMetricsCollector {
    /// Shared metrics storage.
    pub metrics: Arc<PipelineMetrics>,
}

impl AtomicMetricsCollector {
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self { metrics }
    }
}

impl MetricsCollector for AtomicMetricsCollector {
    /// Counts the item as produced and queued.
    fn on_item_produced(&self) {
        self.metrics.produced_items.fetch_add(1, Ordering::SeqCst);
        self.metrics.queued_items.fetch_add(1, Ordering::SeqCst);
    }

    /// Moves one item from queued to running.
    fn on_item_started(&self) {
        self.metrics.queued_items.fetch_sub(1, Ordering::SeqCst);
        self.metrics.running_items.fetch_add(1, Ordering::SeqCst);
    }

    /// Moves one item from running to completed.
    fn on_item_completed(&self) {
        self.metrics.running_items.fetch_sub(1, Ordering::SeqCst);
        self.metrics.completed_items.fetch_add(1, Ordering::SeqCst);
    }

    fn on_consumer_started(&self) {
        self.metrics.active_consumers.fetch_add(1, Ordering::SeqCst);
    }

    fn on_consumer_stopped(&self) {
        self.metrics.active_consumers.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_follow_item_lifecycle() {
        let metrics = Arc::new(PipelineMetrics::new());
        let collector = AtomicMetricsCollector::new(Arc::clone(&metrics));

        collector.on_consumer_started();
        collector.on_item_produced();
        collector.on_item_produced();
        collector.on_item_started();

        assert_eq!(metrics.produced_items.load(Ordering::SeqCst), 2);
        assert_eq!(metrics.queued_items.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.running_items.load(Ordering::SeqCst), 1);

        collector.on_item_completed();
        collector.on_consumer_stopped();

        assert_eq!(metrics.running_items.load(Ordering::SeqCst), 0);
        assert_eq!(metrics.completed_items.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.active_consumers.load(Ordering::SeqCst), 0);
    }
}
