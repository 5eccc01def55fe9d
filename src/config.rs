//! Run configuration.
//!
//! Everything here is fixed at process start and never changes during a run.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::errors::{PipelineError, Result};
use crate::pipeline::producer::Jitter;
use crate::pipeline::DEFAULT_CONSUMERS;
use crate::schedule::Schedule;
use crate::workload::MAX_FIBONACCI_INPUT;

pub const DEFAULT_ITEM_COUNT: usize = 15;
pub const DEFAULT_PAYLOAD_START: u64 = 30;
pub const DEFAULT_SEED: u64 = 123_456;
pub const DEFAULT_MAX_DELAY_MS: u64 = 10;
pub const DEFAULT_SLEEP_ONE_IN: u32 = 4;

/// Minimum item count; the recurrence check needs two results.
pub const MIN_ITEM_COUNT: usize = 2;

/// Parameters of one end-to-end run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Size of the consumer pool.
    pub num_consumers: usize,
    /// Number of items `L`; payloads are `payload_start..payload_start + L`.
    pub item_count: usize,
    pub payload_start: u64,
    /// Seeds both the production order and the jitter.
    pub seed: u64,
    /// Upper bound of a single producer delay, in milliseconds. Zero disables jitter.
    pub max_delay_ms: u64,
    /// The producer skips the delay once in this many pushes on average.
    pub sleep_one_in: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_consumers: DEFAULT_CONSUMERS,
            item_count: DEFAULT_ITEM_COUNT,
            payload_start: DEFAULT_PAYLOAD_START,
            seed: DEFAULT_SEED,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            sleep_one_in: DEFAULT_SLEEP_ONE_IN,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_consumers == 0 {
            return Err(PipelineError::NoConsumers);
        }
        if self.item_count < MIN_ITEM_COUNT {
            return Err(PipelineError::ScheduleTooShort {
                len: self.item_count,
                min: MIN_ITEM_COUNT,
            });
        }
        if self.sleep_one_in == 0 {
            return Err(PipelineError::InvalidSleepRatio(self.sleep_one_in));
        }
        let last_payload = self.payload_start.checked_add(self.item_count as u64 - 1);
        if !matches!(last_payload, Some(last) if last <= MAX_FIBONACCI_INPUT) {
            return Err(PipelineError::PayloadOutOfRange {
                start: self.payload_start,
                len: self.item_count,
                max: MAX_FIBONACCI_INPUT,
            });
        }
        Ok(())
    }

    /// Production order: positions shuffled with a generator seeded from `seed`.
    pub fn schedule(&self) -> Schedule {
        let mut rng = StdRng::seed_from_u64(self.seed);
        Schedule::shuffled(self.item_count, self.payload_start, &mut rng)
    }

    pub fn jitter(&self) -> Jitter {
        if self.max_delay_ms == 0 {
            return Jitter::none();
        }
        Jitter::seeded(
            self.seed,
            Duration::from_millis(self.max_delay_ms),
            self.sleep_one_in,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.num_consumers, 8);
        assert_eq!(config.item_count, 15);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let no_consumers = PipelineConfig {
            num_consumers: 0,
            ..Default::default()
        };
        assert!(matches!(
            no_consumers.validate(),
            Err(PipelineError::NoConsumers)
        ));

        let too_short = PipelineConfig {
            item_count: 1,
            ..Default::default()
        };
        assert!(matches!(
            too_short.validate(),
            Err(PipelineError::ScheduleTooShort { len: 1, min: 2 })
        ));

        let never_skips = PipelineConfig {
            sleep_one_in: 0,
            ..Default::default()
        };
        assert!(matches!(
            never_skips.validate(),
            Err(PipelineError::InvalidSleepRatio(0))
        ));
    }

    #[test]
    fn test_validate_rejects_payloads_past_u64_fibonacci() {
        let near_max = PipelineConfig {
            payload_start: u64::MAX - 1,
            ..Default::default()
        };
        assert!(matches!(
            near_max.validate(),
            Err(PipelineError::PayloadOutOfRange { .. })
        ));

        let just_over = PipelineConfig {
            payload_start: 80,
            item_count: 15,
            ..Default::default()
        };
        assert!(just_over.validate().is_err());

        let last_fits = PipelineConfig {
            payload_start: 79,
            item_count: 15,
            ..Default::default()
        };
        last_fits.validate().unwrap();
    }

    #[test]
    fn test_schedule_is_seeded() {
        let config = PipelineConfig::default();
        assert_eq!(config.schedule(), config.schedule());
        assert_eq!(config.schedule().len(), 15);
    }

    #[test]
    fn test_zero_delay_disables_jitter() {
        let config = PipelineConfig {
            max_delay_ms: 0,
            ..Default::default()
        };
        let mut jitter = config.jitter();
        assert!((0..50).all(|_| jitter.next_delay().is_none()));
    }
}
