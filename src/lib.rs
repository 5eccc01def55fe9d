//! # handoff
//!
//! `handoff` runs a bounded-lifetime producer/consumer pipeline: one producer
//! thread pushes a finite, ordered list of work items into a shared queue, and a
//! fixed pool of consumer threads drains it, computes a result per item and
//! stores it in the slot the item owns.
//!
//! ## Features
//! - Unbounded FIFO guarded by one mutex and one condition variable.
//! - Clean termination: consumers stop once the queue is drained and production is finished.
//! - Write-once result slots, so no two consumers can clobber each other.
//! - Seeded production jitter for reproducible interleavings.
//! - Metrics collection and `tracing` diagnostics.
//!
//! ## Usage
//!
//! ### Basic Usage
//! ```rust
//! use handoff::{PipelineBuilder, Schedule};
//!
//! // 8 consumers computing naive Fibonacci
//! let pipeline = PipelineBuilder::new().build().unwrap();
//!
//! let report = pipeline.run(Schedule::sequential(5, 10)).unwrap();
//! assert_eq!(report.value(0), Some(55));
//! assert_eq!(report.total_processed(), 5);
//! ```
//!
//! ### Custom Workload and Order
//! ```rust
//! use handoff::{PipelineBuilder, Schedule};
//!
//! let pipeline = PipelineBuilder::new()
//!     .num_consumers(2)
//!     .workload(|n: u64| n * n)
//!     .build()
//!     .unwrap();
//!
//! let schedule = Schedule::from_pairs(vec![(2, 3), (0, 1), (1, 2)]).unwrap();
//! let report = pipeline.run(schedule.clone()).unwrap();
//! assert_eq!(report.results(), &[Some(1), Some(4), Some(9)]);
//! report.verify(&schedule, pipeline.workload()).unwrap();
//! ```
//!
//! ### Production Jitter
//! ```rust
//! use handoff::{Jitter, PipelineBuilder, Schedule};
//! use std::time::Duration;
//!
//! let pipeline = PipelineBuilder::new()
//!     .num_consumers(4)
//!     .jitter(Jitter::seeded(123456, Duration::from_millis(2), 4))
//!     .build()
//!     .unwrap();
//!
//! let report = pipeline.run(Schedule::sequential(6, 1)).unwrap();
//! assert!(report.is_complete());
//! ```
//!
//! ### Collecting Metrics
//! ```rust
//! use handoff::{metrics::{AtomicMetricsCollector, PipelineMetrics}, PipelineBuilder, Schedule};
//! use std::sync::{atomic::Ordering, Arc};
//!
//! let metrics = Arc::new(PipelineMetrics::new());
//! let collector = Arc::new(AtomicMetricsCollector::new(metrics.clone()));
//!
//! let pipeline = PipelineBuilder::new()
//!     .with_metrics_collector(collector)
//!     .build()
//!     .unwrap();
//! pipeline.run(Schedule::sequential(4, 3)).unwrap();
//!
//! assert_eq!(metrics.completed_items.load(Ordering::SeqCst), 4);
//! assert_eq!(metrics.active_consumers.load(Ordering::SeqCst), 0);
//! ```

pub mod config;
mod errors;
mod macros;
pub mod metrics;
pub mod orchestrator;
pub mod pipeline;
pub mod queue;
pub mod schedule;
pub mod store;
pub mod verify;
pub mod workload;

pub use config::PipelineConfig;
pub use errors::{PipelineError, Result, VerifyError};
pub use orchestrator::orchestrate;
pub use pipeline::item::WorkItem;
pub use pipeline::producer::Jitter;
pub use pipeline::worker::ConsumerReport;
pub use pipeline::{Pipeline, PipelineBuilder, RunReport};
pub use queue::{Pop, SharedQueue};
pub use schedule::Schedule;
pub use store::ResultStore;
pub use workload::{Fibonacci, Workload};

#[doc(hidden)]
pub use tracing as __tracing;

/// Computes every item of `schedule` on the calling thread, in production order.
///
/// This is the single-threaded baseline the pipeline is measured and checked against.
///
/// # Example
/// ```rust
/// use handoff::{run_sequential, workload::Fibonacci, Schedule};
///
/// let results = run_sequential(&Schedule::sequential(3, 30), &Fibonacci);
/// assert_eq!(results, vec![832040, 1346269, 2178309]);
/// ```
pub fn run_sequential<W: Workload + ?Sized>(schedule: &Schedule, workload: &W) -> Vec<u64> {
    let mut results = vec![0; schedule.len()];
    for item in schedule.items() {
        results[item.position()] = workload.compute(item.payload());
    }
    results
}
