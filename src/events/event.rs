//! # Runtime events emitted by the scheduler, workers and aggregator.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run events**: run lifecycle (starting, draining, completed)
//! - **Worker events**: per-resource execution (starting, finished, failed, timeout, discarded)
//! - **Aggregation events**: folds into the running total
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! resource, values, totals and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use evensum::{Event, EventKind, ResourceId};
//!
//! let ev = Event::new(EventKind::TotalFolded)
//!     .with_resource(ResourceId::new(2))
//!     .with_value(10)
//!     .with_total(12);
//!
//! assert_eq!(ev.kind, EventKind::TotalFolded);
//! assert_eq!(ev.total, Some(12));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::resources::ResourceId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and drop reason
    SubscriberOverflow,

    // === Run events ===
    /// Workers are about to be submitted.
    ///
    /// Sets:
    /// - `count`: number of resources (= pool size)
    RunStarting,

    /// All workers are submitted; the global deadline starts now.
    ///
    /// Sets:
    /// - `timeout_ms`: deadline budget
    DrainStarted,

    /// Drain finished; the outcome is final.
    ///
    /// Sets:
    /// - `total`: final running total
    /// - `count`: number of failed or timed-out resources
    RunCompleted,

    // === Worker events ===
    /// Worker woke up from its startup delay and invokes the reducer.
    ///
    /// Sets:
    /// - `resource`
    /// - `delay_ms`: startup delay that was applied
    WorkerStarting,

    /// Reducer returned a value.
    ///
    /// Sets:
    /// - `resource`
    /// - `value`: partial sum
    WorkerFinished,

    /// Reducer failed (I/O, parse, panic).
    ///
    /// Sets:
    /// - `resource`
    /// - `reason`: failure message
    WorkerFailed,

    /// Worker did not report before the deadline; its slot is a timeout.
    ///
    /// Sets:
    /// - `resource`
    /// - `timeout_ms`: global deadline
    TimeoutHit,

    /// Worker finished after the run completed; its result was dropped.
    ///
    /// Sets:
    /// - `resource`
    ResultDiscarded,

    // === Aggregation events ===
    /// A partial result was folded into the running total.
    ///
    /// Sets:
    /// - `resource`
    /// - `value`: folded contribution
    /// - `total`: running total after the fold
    TotalFolded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Resource concerned, if applicable.
    pub resource: Option<ResourceId>,
    /// Partial sum reported or folded.
    pub value: Option<u64>,
    /// Running total after a fold, or the final total.
    pub total: Option<u128>,
    /// Count (resources in the run, or failures at completion).
    pub count: Option<usize>,
    /// Deadline in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Startup delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            resource: None,
            value: None,
            total: None,
            count: None,
            timeout_ms: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches the resource.
    #[inline]
    pub fn with_resource(mut self, resource: ResourceId) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Attaches a partial value.
    #[inline]
    pub fn with_value(mut self, value: u64) -> Self {
        self.value = Some(value);
        self
    }

    /// Attaches a running total.
    #[inline]
    pub fn with_total(mut self, total: u128) -> Self {
        self.total = Some(total);
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a deadline (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a startup delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::RunStarting);
        let b = Event::new(EventKind::RunStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn durations_are_clamped_to_u32_millis() {
        let ev = Event::new(EventKind::DrainStarted).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));
    }
}
