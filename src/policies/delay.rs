//! # Startup delay policy for workers.
//!
//! [`StartupDelay`] simulates variable per-resource latency by putting each
//! worker to sleep for a random duration before it touches its resource.
//!
//! - [`StartupDelay::None`]: start immediately
//! - [`StartupDelay::Uniform`]: random delay in `[0, max)`

use rand::Rng;
use std::time::Duration;

/// Policy controlling how long a worker waits before reducing its resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StartupDelay {
    /// No delay: the reducer is invoked as soon as the worker runs.
    #[default]
    None,

    /// Uniform delay in `[0, max)`, drawn independently per worker.
    Uniform {
        /// Exclusive upper bound.
        max: Duration,
    },
}

impl StartupDelay {
    /// Draws the delay for one worker.
    pub fn sample(&self) -> Duration {
        match self {
            StartupDelay::None => Duration::ZERO,
            StartupDelay::Uniform { max } => uniform(*max),
        }
    }
}

/// Uniform: random[0, max)
fn uniform(max: Duration) -> Duration {
    let ms = max.as_millis().min(u128::from(u64::MAX)) as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    let mut rng = rand::rng();
    Duration::from_millis(rng.random_range(0..ms))
}
