use std::time::Duration;

use crate::error::{GeolocateError, Result};

/// Longest wait between two attempts.
pub const MAX_DELAY: Duration = Duration::from_secs(300);

/// Exponential backoff for one retry sequence.
///
/// The first retry waits `initial_delay`; every following wait is the
/// previous one multiplied by `backoff_factor`. A policy is plain data and is
/// rebuilt for each call, so nothing carries over between sequences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    tries: u32,
    initial_delay: Duration,
    backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            tries: 5,
            initial_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(tries: u32, initial_delay: Duration, backoff_factor: f64) -> Result<Self> {
        if tries == 0 {
            return Err(GeolocateError::InvalidConfig(
                "tries must be at least 1".to_string(),
            ));
        }
        if initial_delay.is_zero() {
            return Err(GeolocateError::InvalidConfig(
                "initial retry delay must be positive".to_string(),
            ));
        }
        if initial_delay > MAX_DELAY {
            return Err(GeolocateError::InvalidConfig(format!(
                "initial retry delay {:?} exceeds {:?}",
                initial_delay, MAX_DELAY
            )));
        }
        if !backoff_factor.is_finite() || backoff_factor < 1.0 {
            return Err(GeolocateError::InvalidConfig(format!(
                "backoff factor must be a finite number >= 1, got {}",
                backoff_factor
            )));
        }
        Ok(Self {
            tries,
            initial_delay,
            backoff_factor,
        })
    }

    /// Transport-level schedule: `tries` attempts, waiting
    /// `backoff_factor * 2^(n-1)` seconds before retry `n`.
    pub fn transport(tries: u32, backoff_factor: f64) -> Result<Self> {
        if !backoff_factor.is_finite() || backoff_factor <= 0.0 {
            return Err(GeolocateError::InvalidConfig(format!(
                "backoff factor must be a positive number, got {}",
                backoff_factor
            )));
        }
        let initial_delay = Duration::try_from_secs_f64(backoff_factor)
            .map_err(|e| GeolocateError::InvalidConfig(format!("backoff factor: {}", e)))?;
        Self::new(tries, initial_delay, 2.0)
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Delay that follows `current`, capped at [`MAX_DELAY`].
    pub fn next_delay(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor)
            .unwrap_or(MAX_DELAY)
            .min(MAX_DELAY)
    }
}
