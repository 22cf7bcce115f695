//! Runtime core: workers, aggregation, scheduling and run control.
//!
//! Public API from this module: [`RunController`] (with its builder and
//! [`RunHandle`]), [`Aggregator`] and [`LiveTotals`], and the result types
//! in [`outcome`].
//!
//! Internal modules:
//! - [`worker`]: one reducer call with startup delay and panic isolation;
//! - [`aggregator`]: running total, live sequence, sealing;
//! - [`scheduler`]: pool of N workers, submission-order drain under one deadline;
//! - [`controller`]: wires the above together per run.

mod aggregator;
mod builder;
mod controller;
mod outcome;
mod scheduler;
mod worker;

pub use aggregator::{Aggregator, LiveTotals};
pub use builder::RunControllerBuilder;
pub use controller::{RunController, RunHandle};
pub use outcome::{PartialResult, RunOutcome, RunPhase, Total};
