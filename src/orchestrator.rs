//! End-to-end run: schedule, produce, consume, join, verify.

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::metrics::MetricsCollector;
use crate::pipeline::{PipelineBuilder, RunReport};
use crate::verify;
use crate::workload::Fibonacci;

/// Runs the Fibonacci pipeline described by `config` and verifies the results.
///
/// Verification checks completeness, every slot against the oracle, and the
/// Fibonacci recurrence. Any failure is returned; callers treat it as fatal.
pub fn orchestrate(
    config: &PipelineConfig,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
) -> Result<RunReport> {
    config.validate()?;

    let schedule = config.schedule();
    let mut builder = PipelineBuilder::new()
        .num_consumers(config.num_consumers)
        .jitter(config.jitter());
    if let Some(collector) = metrics_collector {
        builder = builder.with_metrics_collector(collector);
    }
    let pipeline = builder.build()?;

    let report = pipeline.run(schedule.clone())?;

    tracing::info!("checking results");
    let values = report.verify(&schedule, &Fibonacci)?;
    verify::check_fibonacci(&values, config.payload_start)?;
    tracing::info!("results ok");

    Ok(report)
}
