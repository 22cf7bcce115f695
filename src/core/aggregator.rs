//! # Aggregator: owner of the running total and the live totals sequence.
//!
//! All mutation goes through [`Aggregator::fold`], which runs under a single
//! write lock: concurrent folds never lose an update and never interleave.
//!
//! ```text
//! fold(result) ──► [write lock] ──► total += contribution
//!                                  ├─► sequence.push(total)
//!                                  ├─► live.send(total)  ──► LiveTotals (consumer)
//!                                  └─► publish TotalFolded
//! seal()       ──► [write lock] ──► sealed = true, live channel closed
//! ```
//!
//! ## Rules
//! - The total is a `u128`: any sum of `u64` partials from one pool fits, so
//!   folds never clamp or wrap.
//! - Failed results append nothing (one entry per successful fold).
//! - After [`seal`](Aggregator::seal) every fold is rejected.
//! - Fold order is decided by the caller (the scheduler's drain loop).

use std::sync::Arc;

use futures::Stream;
use tokio::sync::{RwLock, mpsc};

use crate::core::outcome::{PartialResult, Total};
use crate::events::{Bus, Event, EventKind};

struct Ledger {
    total: u128,
    sequence: Vec<u128>,
    live: Option<mpsc::UnboundedSender<u128>>,
    sealed: bool,
}

/// Thread-safe running total with an append-only snapshot log.
pub struct Aggregator {
    ledger: RwLock<Ledger>,
    bus: Bus,
}

impl Aggregator {
    /// Creates an aggregator and the consumer side of its live sequence.
    pub fn new(bus: Bus) -> (Arc<Self>, LiveTotals) {
        let (tx, rx) = mpsc::unbounded_channel();
        let agg = Arc::new(Self {
            ledger: RwLock::new(Ledger {
                total: 0,
                sequence: Vec::new(),
                live: Some(tx),
                sealed: false,
            }),
            bus,
        });
        (agg, LiveTotals { rx })
    }

    /// Folds one partial result into the running total.
    ///
    /// Returns the appended snapshot, or `None` when nothing was appended
    /// (the result is a failure, or the aggregator is sealed).
    pub async fn fold(&self, result: &PartialResult) -> Option<u128> {
        if result.outcome.is_err() {
            return None;
        }
        let value = result.contribution();

        let mut ledger = self.ledger.write().await;
        if ledger.sealed {
            return None;
        }
        // at most Semaphore::MAX_PERMITS partials below 2^64 each
        ledger.total += u128::from(value);
        let snapshot = ledger.total;
        ledger.sequence.push(snapshot);
        if let Some(live) = &ledger.live {
            // a dropped consumer only loses the live view; the log keeps everything
            let _ = live.send(snapshot);
        }
        drop(ledger);

        self.bus.publish(
            Event::new(EventKind::TotalFolded)
                .with_resource(result.resource)
                .with_value(value)
                .with_total(snapshot),
        );
        Some(snapshot)
    }

    /// Returns a copy of every snapshot appended so far.
    pub async fn snapshot_sequence(&self) -> Vec<u128> {
        self.ledger.read().await.sequence.clone()
    }

    /// Returns the running total, labeled final once sealed.
    pub async fn total(&self) -> Total {
        let ledger = self.ledger.read().await;
        if ledger.sealed {
            Total::Final(ledger.total)
        } else {
            Total::Partial(ledger.total)
        }
    }

    /// Rejects further folds, closes the live sequence and returns the final total.
    ///
    /// Idempotent.
    pub async fn seal(&self) -> u128 {
        let mut ledger = self.ledger.write().await;
        ledger.sealed = true;
        ledger.live = None;
        ledger.total
    }
}

/// Consumer side of the live totals sequence.
///
/// Yields each snapshot once, in fold order, and ends when the run completes.
#[derive(Debug)]
pub struct LiveTotals {
    rx: mpsc::UnboundedReceiver<u128>,
}

impl LiveTotals {
    /// Waits for the next snapshot; `None` once the run completed and all
    /// snapshots were consumed.
    pub async fn next(&mut self) -> Option<u128> {
        self.rx.recv().await
    }

    /// Adapts the sequence into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = u128> + Send + Unpin {
        Box::pin(futures::stream::unfold(self, |mut live| async move {
            live.next().await.map(|v| (v, live))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResourceError;
    use crate::resources::ResourceId;
    use futures::StreamExt;

    fn ok(index: usize, value: u64) -> PartialResult {
        PartialResult {
            resource: ResourceId::new(index),
            outcome: Ok(value),
        }
    }

    #[tokio::test]
    async fn folds_append_snapshots_in_call_order() {
        let (agg, live) = Aggregator::new(Bus::new(16));

        assert_eq!(agg.fold(&ok(1, 2)).await, Some(2));
        assert_eq!(agg.fold(&ok(2, 10)).await, Some(12));
        assert_eq!(agg.fold(&ok(3, 8)).await, Some(20));
        assert_eq!(agg.total().await, Total::Partial(20));

        assert_eq!(agg.seal().await, 20);
        let seen: Vec<u128> = live.into_stream().collect().await;
        assert_eq!(seen, vec![2, 12, 20]);
        assert_eq!(agg.snapshot_sequence().await, vec![2, 12, 20]);
    }

    #[tokio::test]
    async fn failures_append_nothing() {
        let (agg, _live) = Aggregator::new(Bus::new(16));
        let failed = PartialResult {
            resource: ResourceId::new(1),
            outcome: Err(ResourceError::Io {
                resource: ResourceId::new(1),
                error: "missing".into(),
            }),
        };

        assert_eq!(agg.fold(&failed).await, None);
        assert!(agg.snapshot_sequence().await.is_empty());
        assert_eq!(agg.total().await, Total::Partial(0));
    }

    #[tokio::test]
    async fn zero_contribution_is_still_a_fold() {
        let (agg, _live) = Aggregator::new(Bus::new(16));
        assert_eq!(agg.fold(&ok(1, 0)).await, Some(0));
        assert_eq!(agg.snapshot_sequence().await, vec![0]);
    }

    #[tokio::test]
    async fn sealed_aggregator_rejects_folds() {
        let (agg, mut live) = Aggregator::new(Bus::new(16));
        agg.fold(&ok(1, 4)).await;
        assert_eq!(agg.seal().await, 4);
        assert_eq!(agg.seal().await, 4);

        assert_eq!(agg.fold(&ok(2, 6)).await, None);
        assert_eq!(agg.total().await, Total::Final(4));
        assert_eq!(live.next().await, Some(4));
        assert_eq!(live.next().await, None);
    }

    #[tokio::test]
    async fn total_grows_past_u64_without_clamping() {
        let (agg, _live) = Aggregator::new(Bus::new(16));
        // one resource holding two i64::MAX - 1 values
        let big = 2 * (i64::MAX - 1) as u64;

        agg.fold(&ok(1, big)).await;
        agg.fold(&ok(2, big)).await;
        agg.fold(&ok(3, 2)).await;

        let expected = 2 * u128::from(big) + 2;
        assert!(expected > u128::from(u64::MAX));
        assert_eq!(agg.total().await.value(), expected);
        assert_eq!(
            agg.snapshot_sequence().await,
            vec![u128::from(big), 2 * u128::from(big), expected]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_folds_lose_no_update() {
        let (agg, _live) = Aggregator::new(Bus::new(16));

        let mut set = tokio::task::JoinSet::new();
        for i in 1..=200u64 {
            let agg = Arc::clone(&agg);
            set.spawn(async move { agg.fold(&ok(i as usize, i * 2)).await });
        }
        while set.join_next().await.is_some() {}

        let expected: u128 = (1..=200u128).map(|i| i * 2).sum();
        assert_eq!(agg.total().await.value(), expected);

        let seq = agg.snapshot_sequence().await;
        assert_eq!(seq.len(), 200);
        assert!(seq.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seq.last().copied(), Some(expected));
    }
}
