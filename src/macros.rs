//! # Macros for `handoff`
//!
//! Small conveniences for building pipelines and reporting their metrics.

/// Logs a snapshot of pipeline metrics through `tracing`.
///
/// # Example
/// ```rust
/// use handoff::{log_metrics, metrics::PipelineMetrics};
///
/// let metrics = PipelineMetrics::new();
/// log_metrics!(metrics);
/// ```
#[macro_export]
macro_rules! log_metrics {
    ($metrics:expr) => {
        $crate::__tracing::info!(
            produced = $metrics
                .produced_items
                .load(::std::sync::atomic::Ordering::SeqCst),
            queued = $metrics
                .queued_items
                .load(::std::sync::atomic::Ordering::SeqCst),
            running = $metrics
                .running_items
                .load(::std::sync::atomic::Ordering::SeqCst),
            completed = $metrics
                .completed_items
                .load(::std::sync::atomic::Ordering::SeqCst),
            active_consumers = $metrics
                .active_consumers
                .load(::std::sync::atomic::Ordering::SeqCst),
            "pipeline metrics"
        );
    };
}

/// Builds a pipeline with the given consumer count and, optionally, a workload.
///
/// Expands to a `Result<Pipeline<_>, PipelineError>`.
///
/// # Examples
/// ```rust
/// use handoff::create_pipeline;
///
/// let fib = create_pipeline!(consumers: 2).unwrap();
/// let squares = create_pipeline!(consumers: 4, workload: |n: u64| n * n).unwrap();
/// assert_eq!(squares.num_consumers(), 4);
/// # let _ = fib;
/// ```
#[macro_export]
macro_rules! create_pipeline {
    (consumers: $num:expr) => {
        $crate::PipelineBuilder::new().num_consumers($num).build()
    };
    (consumers: $num:expr, workload: $workload:expr) => {
        $crate::PipelineBuilder::new()
            .num_consumers($num)
            .workload($workload)
            .build()
    };
}
