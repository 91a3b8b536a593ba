//! Random wait between turns.

use std::time::Duration;

use rand::Rng;

use crate::error::{Error, Result};

/// Uniform integer-second intervals in `[min, max]`, inclusive.
///
/// Bounds are checked once, at construction; drawing never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalGenerator {
    min_secs: u64,
    max_secs: u64,
}

impl IntervalGenerator {
    pub fn new(min_secs: u64, max_secs: u64) -> Result<Self> {
        if min_secs > max_secs {
            return Err(Error::Configuration(format!(
                "interval_min_sec ({}) must be less than or equal to interval_max_sec ({})",
                min_secs, max_secs
            )));
        }
        Ok(Self { min_secs, max_secs })
    }

    pub fn min_secs(&self) -> u64 {
        self.min_secs
    }

    pub fn max_secs(&self) -> u64 {
        self.max_secs
    }

    /// Draw the next wait, independently of every previous draw.
    pub fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_secs(rng.gen_range(self.min_secs..=self.max_secs))
    }
}
