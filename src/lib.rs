//! # evensum
//!
//! **evensum** sums the positive even integers of a fixed set of resources,
//! one concurrent worker per resource, and folds the partial sums into a
//! single running total that a consumer can watch grow in real time.
//!
//! Per-resource failures (unreadable resource, malformed token, panic, timeout)
//! are isolated: they are counted and contribute `0`. A single global deadline
//! bounds the whole run; workers that miss it are abandoned and their late
//! results are never folded.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ resource#1   │   │ resource#2   │   │ resource#3   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  RunController                                                    │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! │  - per run: Scheduler + Aggregator                                │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Worker     │   │   Worker     │   │   Worker     │
//!     │ delay+reduce │   │ delay+reduce │   │ delay+reduce │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//!         slot #1            slot #2            slot #3      (filled in any order)
//!            └──────────────────┼──────────────────┘
//!                               ▼
//!              Scheduler drain loop (slot 1, 2, 3, ... under one deadline)
//!                               ▼
//!              Aggregator::fold ──► running total ──► LiveTotals (consumer)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ──► Running ──► Draining ──► Completed
//!
//! Running:   one Worker per resource, pool of exactly N permits
//! Draining:  deadline = now + Config::deadline
//!            for each slot in submission order:
//!              ├─ filled          ─► fold
//!              ├─ fills in time   ─► fold
//!              └─ deadline passed ─► Timeout (0), remaining unfilled slots time out at once
//! Completed: pool closed, stragglers abandoned, total sealed, RunOutcome returned
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Runs**          | Start runs, watch live totals, collect outcomes.             | [`RunController`], [`RunHandle`]          |
//! | **Aggregation**   | Lock-guarded running total with an ordered snapshot log.     | [`Aggregator`], [`LiveTotals`], [`Total`] |
//! | **Resources**     | Pluggable reducers, file-backed reducer, text grammar.       | [`Reduce`], [`ReducerFn`], [`FileReducer`]|
//! | **Subscriber API**| Hook into run events (logging, custom observers).            | [`Subscribe`], [`SubscriberSet`]          |
//! | **Errors**        | Typed per-resource and runtime errors.                       | [`ResourceError`], [`RuntimeError`]       |
//! | **Configuration** | Startup delay bound, global deadline, bus capacity.          | [`Config`]                                |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a subscriber forwarding events to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use evensum::{Config, ReducerFn, ReducerRef, ResourceError, ResourceId, RunController};
//! use evensum::resources::parse::sum_positive_evens;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let data = ["2\n-4\n3\n", "10\n11\n", "-6\n7\n8\n"];
//!     let reducer: ReducerRef = ReducerFn::arc("memory", move |id: ResourceId| async move {
//!         sum_positive_evens(id, data[id.index() - 1])
//!     });
//!
//!     let cfg = Config::default()
//!         .with_max_delay(Duration::from_millis(20))
//!         .with_deadline(Duration::from_secs(5));
//!     let ctl = RunController::builder(cfg).build();
//!
//!     let outcome = ctl.run(ResourceId::range(3), reducer).await?;
//!     assert_eq!(outcome.total(), 20);
//!     assert_eq!(outcome.sequence(), &[2, 12, 20]);
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod policies;
pub mod resources;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{
    Aggregator, LiveTotals, PartialResult, RunController, RunControllerBuilder, RunHandle,
    RunOutcome, RunPhase, Total,
};
pub use error::{ResourceError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use policies::StartupDelay;
pub use resources::{FileReducer, Reduce, ReducerFn, ReducerRef, ResourceId};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in subscriber forwarding events to `tracing`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
