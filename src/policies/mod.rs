//! Worker policies.
//!
//! ## Contents
//! - [`StartupDelay`] how long a worker sleeps before reducing its resource
//!
//! ## Quick wiring
//! ```text
//! Config { max_delay, .. }
//!      └─► Config::startup_delay() ─► StartupDelay
//!           └─► core::worker::Worker sleeps delay.sample() before the reducer runs
//! ```

mod delay;

pub use delay::StartupDelay;
