pub mod item;
pub mod producer;
pub mod worker;

use std::sync::Arc;

use crossbeam::thread::{Scope, ScopedJoinHandle};

use crate::errors::{PipelineError, Result, VerifyError};
use crate::metrics::MetricsCollector;
use crate::queue::SharedQueue;
use crate::schedule::Schedule;
use crate::store::ResultStore;
use crate::verify;
use crate::workload::{Fibonacci, Workload};
use item::WorkItem;
use producer::{produce, Jitter};
use worker::{consumer_loop, ConsumerReport};

/// Number of consumers used when none is configured.
pub const DEFAULT_CONSUMERS: usize = 8;

/// Builder for a [`Pipeline`].
///
/// The type parameter is the workload; it changes when [`workload`](Self::workload) is called.
pub struct PipelineBuilder<W = Fibonacci> {
    num_consumers: usize,
    jitter: Jitter,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
    workload: W,
}

impl PipelineBuilder<Fibonacci> {
    pub fn new() -> Self {
        Self {
            num_consumers: DEFAULT_CONSUMERS,
            jitter: Jitter::none(),
            metrics_collector: None,
            workload: Fibonacci,
        }
    }
}

impl Default for PipelineBuilder<Fibonacci> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Workload> PipelineBuilder<W> {
    pub fn num_consumers(mut self, n: usize) -> Self {
        self.num_consumers = n;
        self
    }

    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_metrics_collector(mut self, collector: Arc<dyn MetricsCollector>) -> Self {
        self.metrics_collector = Some(collector);
        self
    }

    /// Replaces the workload every consumer runs.
    pub fn workload<W2: Workload>(self, workload: W2) -> PipelineBuilder<W2> {
        PipelineBuilder {
            num_consumers: self.num_consumers,
            jitter: self.jitter,
            metrics_collector: self.metrics_collector,
            workload,
        }
    }

    /// # Errors
    /// [`PipelineError::NoConsumers`] if zero consumers were requested.
    pub fn build(self) -> Result<Pipeline<W>> {
        if self.num_consumers == 0 {
            return Err(PipelineError::NoConsumers);
        }
        Ok(Pipeline {
            num_consumers: self.num_consumers,
            jitter: self.jitter,
            metrics_collector: self.metrics_collector,
            workload: self.workload,
        })
    }
}

/// One producer feeding a fixed pool of consumers through a [`SharedQueue`].
///
/// Every call to [`run`](Self::run) starts fresh threads and joins them all
/// before returning.
pub struct Pipeline<W = Fibonacci> {
    num_consumers: usize,
    jitter: Jitter,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
    workload: W,
}

impl<W: Workload> Pipeline<W> {
    pub fn num_consumers(&self) -> usize {
        self.num_consumers
    }

    pub fn workload(&self) -> &W {
        &self.workload
    }

    /// Produces every item of `schedule`, consumes them on the consumer pool and
    /// returns the filled result store.
    ///
    /// The jitter generator restarts from its seed on every run.
    ///
    /// # Errors
    /// A thread that fails to spawn or panics, or a broken slot invariant, fails the run.
    /// All threads that did start are joined before this returns.
    pub fn run(&self, schedule: Schedule) -> Result<RunReport> {
        let len = schedule.len();
        let queue = SharedQueue::new();
        let store = ResultStore::new(len);

        tracing::info!(
            consumers = self.num_consumers,
            items = len,
            "starting pipeline"
        );

        let joined = crossbeam::thread::scope(|scope| {
            self.spawn_and_join(scope, &queue, &store, schedule.into_items())
        })
        .map_err(|_| PipelineError::ThreadPanicked)?;
        let (produced, consumers) = joined?;

        let report = RunReport {
            results: store.into_results(),
            consumers,
            produced,
        };
        tracing::info!(
            produced = report.produced,
            processed = report.total_processed(),
            "pipeline finished"
        );
        Ok(report)
    }

    fn spawn_and_join<'env>(
        &'env self,
        scope: &Scope<'env>,
        queue: &'env SharedQueue<WorkItem>,
        store: &'env ResultStore,
        items: Vec<WorkItem>,
    ) -> Result<(usize, Vec<ConsumerReport>)> {
        let workload = &self.workload;
        let mut consumers: Vec<ScopedJoinHandle<'_, Result<ConsumerReport>>> =
            Vec::with_capacity(self.num_consumers);

        for id in 0..self.num_consumers {
            let metrics_collector = self.metrics_collector.clone();
            let spawned = scope
                .builder()
                .name(format!("consumer-{id}"))
                .spawn(move |_| consumer_loop(id, queue, store, workload, metrics_collector));

            match spawned {
                Ok(handle) => consumers.push(handle),
                Err(source) => {
                    // Release the consumers already waiting; the scope joins them.
                    queue.mark_finished();
                    return Err(PipelineError::Spawn {
                        role: "consumer",
                        source,
                    });
                }
            }
        }

        let jitter = self.jitter.clone();
        let metrics_collector = self.metrics_collector.clone();
        let producer = scope
            .builder()
            .name("producer".to_string())
            .spawn(move |_| produce(items, queue, jitter, metrics_collector))
            .map_err(|source| {
                queue.mark_finished();
                PipelineError::Spawn {
                    role: "producer",
                    source,
                }
            })?;

        // Join everything before looking at any outcome.
        let reports: Vec<_> = consumers.into_iter().map(|h| h.join()).collect();
        let produced = producer.join();

        let produced = produced.map_err(|_| PipelineError::ThreadPanicked)??;
        let mut consumer_reports = Vec::with_capacity(reports.len());
        for report in reports {
            consumer_reports.push(report.map_err(|_| PipelineError::ThreadPanicked)??);
        }
        Ok((produced, consumer_reports))
    }
}

/// The outcome of a finished [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    results: Vec<Option<u64>>,
    consumers: Vec<ConsumerReport>,
    produced: usize,
}

impl RunReport {
    /// Result slots indexed by position.
    pub fn results(&self) -> &[Option<u64>] {
        &self.results
    }

    pub fn value(&self, position: usize) -> Option<u64> {
        self.results.get(position).copied().flatten()
    }

    pub fn consumers(&self) -> &[ConsumerReport] {
        &self.consumers
    }

    /// Items the producer pushed.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Items popped across all consumers.
    pub fn total_processed(&self) -> usize {
        self.consumers.iter().map(|c| c.processed).sum()
    }

    /// Whether every slot holds a value.
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(Option::is_some)
    }

    /// Checks completeness and compares every slot with `workload.expected`.
    pub fn verify<W: Workload + ?Sized>(
        &self,
        schedule: &Schedule,
        workload: &W,
    ) -> Result<Vec<u64>, VerifyError> {
        let values = verify::check_complete(&self.results)?;
        verify::check_against(&values, schedule, workload)?;
        Ok(values)
    }
}
