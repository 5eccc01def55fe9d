//! Consumer logic for the pipeline

use std::fmt;
use std::sync::Arc;

use super::item::WorkItem;
use crate::errors::Result;
use crate::metrics::MetricsCollector;
use crate::queue::{Pop, SharedQueue};
use crate::store::ResultStore;
use crate::workload::Workload;

/// Where a consumer is in its lifecycle: `Waiting -> {Processing -> Waiting}* -> Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Waiting,
    Processing,
    Terminated,
}

impl fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConsumerState::Waiting => "waiting",
            ConsumerState::Processing => "processing",
            ConsumerState::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// What a consumer did during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerReport {
    pub id: usize,
    /// Items this consumer popped and stored.
    pub processed: usize,
}

/// Consumer thread main loop
///
/// Pops until the queue reports done. The workload runs with the queue unlocked,
/// and each result goes to the slot of the item this consumer popped.
pub fn consumer_loop<W>(
    id: usize,
    queue: &SharedQueue<WorkItem>,
    store: &ResultStore,
    workload: &W,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
) -> Result<ConsumerReport>
where
    W: Workload + ?Sized,
{
    tracing::info!(consumer = id, "consumer: starting");
    metrics_collector
        .as_ref()
        .map(|m| m.on_consumer_started());

    let mut processed = 0;
    let mut state = ConsumerState::Waiting;

    let outcome = loop {
        tracing::trace!(consumer = id, %state);
        let item = match queue.pop_or_wait() {
            Pop::Item(item) => item,
            Pop::Done => break Ok(()),
        };

        state = ConsumerState::Processing;
        tracing::trace!(consumer = id, %state);
        tracing::debug!(
            consumer = id,
            payload = item.payload(),
            "consumer: acquired data to process"
        );
        metrics_collector.as_ref().map(|m| m.on_item_started());

        let result = workload.compute(item.payload());
        tracing::debug!(
            consumer = id,
            payload = item.payload(),
            result,
            "consumer: calculation result"
        );

        if let Err(e) = store.write(item.position(), result) {
            break Err(e);
        }
        processed += 1;
        metrics_collector
            .as_ref()
            .map(|m| m.on_item_completed());
        state = ConsumerState::Waiting;
    };

    state = ConsumerState::Terminated;
    tracing::trace!(consumer = id, %state);
    metrics_collector
        .as_ref()
        .map(|m| m.on_consumer_stopped());
    tracing::info!(consumer = id, processed, "consumer: ending");

    outcome.map(|()| ConsumerReport { id, processed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;

    #[test]
    fn test_single_consumer_drains_queue() {
        let queue = SharedQueue::new();
        let store = ResultStore::new(3);
        for pos in [2, 0, 1] {
            queue.push(WorkItem::new(pos, pos as u64 + 1)).unwrap();
        }
        queue.mark_finished();

        let double = |n: u64| n * 2;
        let report = consumer_loop(0, &queue, &store, &double, None).unwrap();

        assert_eq!(report, ConsumerReport { id: 0, processed: 3 });
        assert_eq!(store.into_results(), vec![Some(2), Some(4), Some(6)]);
    }

    #[test]
    fn test_consumer_exits_immediately_when_done() {
        let queue = SharedQueue::new();
        queue.mark_finished();
        let store = ResultStore::new(0);

        let report = consumer_loop(3, &queue, &store, &|n: u64| n, None).unwrap();
        assert_eq!(report.processed, 0);
    }

    #[test]
    fn test_duplicate_position_is_reported() {
        let queue = SharedQueue::new();
        let store = ResultStore::new(1);
        queue.push(WorkItem::new(0, 1)).unwrap();
        queue.push(WorkItem::new(0, 1)).unwrap();
        queue.mark_finished();

        let result = consumer_loop(0, &queue, &store, &|n: u64| n, None);
        assert!(matches!(
            result,
            Err(PipelineError::SlotAlreadyWritten { position: 0 })
        ));
    }
}
