//! # Global run configuration.
//!
//! Provides [`Config`] centralized settings for a run.
//!
//! ## Sentinel values
//! - `max_delay = 0s` → workers start immediately (no randomized startup delay)
//! - `deadline = 0s` → only results already present when draining starts are folded

use std::time::Duration;

use crate::policies::StartupDelay;

/// Global configuration for a run.
///
/// ## Field semantics
/// - `max_delay`: Upper bound (exclusive) of each worker's random startup delay
/// - `deadline`: Global budget for the whole drain phase
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Upper bound of the randomized startup delay applied to every worker.
    ///
    /// - `Duration::ZERO` = no delay
    /// - `> 0` = uniform delay in `[0, max_delay)`
    pub max_delay: Duration,

    /// Global completion deadline for the drain phase.
    ///
    /// The budget is shared by all slots: once it is exhausted, every slot
    /// still unfilled is a timeout immediately.
    pub deadline: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the startup delay policy derived from `max_delay`.
    #[inline]
    pub fn startup_delay(&self) -> StartupDelay {
        if self.max_delay == Duration::ZERO {
            StartupDelay::None
        } else {
            StartupDelay::Uniform { max: self.max_delay }
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a copy with a different deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns a copy with a different startup-delay bound.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_delay = 4s`
    /// - `deadline = 60s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            max_delay: Duration::from_secs(4),
            deadline: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_disables_startup_delay() {
        let cfg = Config::default().with_max_delay(Duration::ZERO);
        assert_eq!(cfg.startup_delay(), StartupDelay::None);
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
