//! Backoff strategies for the retry engine.

use std::time::Duration;

/// Backoff strategy for retries.
#[derive(Debug, Clone)]
pub enum Backoff {
    /// Fixed delay between retries.
    Constant { delay: Duration },
    /// Linearly increasing delay.
    Linear { base: Duration },
    /// `min(max, initial * factor^(attempt - 1))`, attempt is 1-indexed.
    Exponential { initial: Duration, factor: f64, max: Option<Duration> },
}

impl Backoff {
    pub fn constant(delay: Duration) -> Self {
        Backoff::Constant { delay }
    }

    pub fn linear(base: Duration) -> Self {
        Backoff::Linear { base }
    }

    /// Exponential backoff with the conventional growth factor of 2.0.
    pub fn exponential(initial: Duration) -> Self {
        Backoff::Exponential { initial, factor: 2.0, max: None }
    }

    /// Exponential backoff with an explicit growth factor, per the
    /// `min(max, initial * factor^attempt)` retry formula.
    pub fn exponential_with_factor(initial: Duration, factor: f64) -> Self {
        Backoff::Exponential { initial, factor, max: None }
    }

    pub fn with_max(mut self, max: Duration) -> Self {
        if let Backoff::Exponential { max: ref mut m, .. } = self {
            *m = Some(max);
        }
        self
    }

    /// Calculate the delay for a given attempt number (1-indexed).
    pub fn delay(&self, attempt: usize) -> Duration {
        match self {
            Backoff::Constant { delay } => *delay,
            Backoff::Linear { base } => {
                base.checked_mul(attempt as u32).unwrap_or(Duration::from_secs(u64::MAX))
            }
            Backoff::Exponential { initial, factor, max } => {
                let exponent = attempt.saturating_sub(1) as i32;
                let multiplier = factor.powi(exponent);
                let raw_secs = (initial.as_secs_f64() * multiplier).max(0.0);
                let exp_delay = if raw_secs.is_finite() && raw_secs < u64::MAX as f64 {
                    Duration::from_secs_f64(raw_secs)
                } else {
                    Duration::from_secs(u64::MAX)
                };
                match max {
                    Some(max) => exp_delay.min(*max),
                    None => exp_delay,
                }
            }
        }
    }
}
