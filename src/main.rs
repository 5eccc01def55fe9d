use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use handoff::config::{
    DEFAULT_ITEM_COUNT, DEFAULT_MAX_DELAY_MS, DEFAULT_PAYLOAD_START, DEFAULT_SEED,
    DEFAULT_SLEEP_ONE_IN,
};
use handoff::metrics::{AtomicMetricsCollector, MetricsCollector, PipelineMetrics};
use handoff::pipeline::DEFAULT_CONSUMERS;
use handoff::{log_metrics, orchestrate, PipelineConfig};

/// One producer, a pool of consumers, naive Fibonacci on every item.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Number of consumer threads.
    #[arg(short = 'c', long = "consumers", default_value_t = DEFAULT_CONSUMERS)]
    num_consumers: usize,

    /// Number of work items (at least 2).
    #[arg(short = 'n', long = "items", default_value_t = DEFAULT_ITEM_COUNT)]
    item_count: usize,

    /// Payload of position 0; position i computes fib(payload_start + i).
    #[arg(long, default_value_t = DEFAULT_PAYLOAD_START)]
    payload_start: u64,

    /// Seed for the production order and the jitter.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Longest producer delay between pushes, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_MAX_DELAY_MS)]
    max_delay_ms: u64,

    /// Skip the producer delay once in this many pushes.
    #[arg(long, default_value_t = DEFAULT_SLEEP_ONE_IN)]
    sleep_one_in: u32,

    /// Push every item without delay.
    #[arg(long)]
    no_jitter: bool,
}

impl From<Args> for PipelineConfig {
    fn from(args: Args) -> Self {
        Self {
            num_consumers: args.num_consumers,
            item_count: args.item_count,
            payload_start: args.payload_start,
            seed: args.seed,
            max_delay_ms: if args.no_jitter { 0 } else { args.max_delay_ms },
            sleep_one_in: args.sleep_one_in,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_names(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let config = PipelineConfig::from(Args::parse());
    tracing::info!(?config, "starting main thread");

    let metrics = Arc::new(PipelineMetrics::new());
    let collector: Arc<dyn MetricsCollector> =
        Arc::new(AtomicMetricsCollector::new(Arc::clone(&metrics)));

    let report = orchestrate(&config, Some(collector)).context("pipeline run failed")?;
    log_metrics!(metrics);

    for (position, value) in report.results().iter().enumerate() {
        tracing::debug!(position, value = ?value, "result");
    }
    tracing::info!("ending main thread");
    Ok(())
}
