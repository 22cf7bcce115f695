//! # Scheduler: one worker per resource, drained in submission order.
//!
//! ## State machine
//! ```text
//! Idle ──launch()──► Running ──drain()──► Draining ──► Completed
//! ```
//!
//! ## Launch
//! ```text
//! resources[0] resources[1] ... resources[N-1]
//!      │            │                 │
//!      └──► Worker::new(..., pool)    (pool = Semaphore with exactly N permits)
//!             └──► workers.spawn(worker.run(slot_tx[k]))
//! slots: [slot_rx[0], slot_rx[1], ..., slot_rx[N-1]]
//! ```
//!
//! ## Drain
//! ```text
//! deadline = now + cfg.deadline        (one budget for the whole loop)
//! for k in 0..N:
//!   ├─ slot k already filled        ─► take it (even past the deadline)
//!   ├─ deadline not yet reached     ─► wait until deadline for slot k
//!   │     ├─ filled                 ─► take it
//!   │     └─ deadline reached       ─► Timeout, publish TimeoutHit
//!   ├─ deadline already reached     ─► Timeout immediately (no re-wait)
//!   └─ aggregator.fold(result)
//! pool.close(); workers.detach_all(); aggregator.seal()
//! ```
//!
//! ## Rules
//! - Folds happen in submission order, whatever the completion order.
//! - Workers still running at completion are abandoned, not cancelled; their
//!   slots are gone so their results are never folded.
//! - A worker that vanished without reporting counts as `Panicked`.
//! - A slot is closed before it becomes a timeout: a result sent in the same
//!   instant is folded, a later one is refused and reported by its worker.

use std::sync::Arc;

use tokio::sync::{Semaphore, oneshot, watch};
use tokio::task::JoinSet;
use tokio::time::{self, Instant};

use crate::config::Config;
use crate::core::aggregator::Aggregator;
use crate::core::outcome::{PartialResult, RunOutcome, RunPhase};
use crate::core::worker::Worker;
use crate::error::{ResourceError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::resources::{ReducerRef, ResourceId};

/// Receiving end of one worker's result.
struct Slot {
    resource: ResourceId,
    rx: oneshot::Receiver<PartialResult>,
}

/// Workers submitted to the pool, waiting to be drained.
pub struct Launched {
    slots: Vec<Slot>,
    workers: JoinSet<()>,
    pool: Arc<Semaphore>,
}

/// Creates workers and drains their results under the global deadline.
pub struct Scheduler {
    cfg: Config,
    bus: Bus,
    phase: watch::Sender<RunPhase>,
}

impl Scheduler {
    /// Creates an idle scheduler.
    pub fn new(cfg: Config, bus: Bus, phase: watch::Sender<RunPhase>) -> Self {
        Self { cfg, bus, phase }
    }

    /// Submits one worker per resource to a pool of exactly `resources.len()` permits.
    ///
    /// Fails when no tokio runtime is available or the pool would exceed the
    /// semaphore's permit limit.
    pub fn launch(
        &self,
        resources: Vec<ResourceId>,
        reducer: ReducerRef,
    ) -> Result<Launched, RuntimeError> {
        tokio::runtime::Handle::try_current().map_err(|_| RuntimeError::NoRuntime)?;
        let size = resources.len();
        if size > Semaphore::MAX_PERMITS {
            return Err(RuntimeError::PoolExhausted {
                requested: size,
                limit: Semaphore::MAX_PERMITS,
            });
        }

        self.phase.send_replace(RunPhase::Running);
        self.bus
            .publish(Event::new(EventKind::RunStarting).with_count(size));

        let pool = Arc::new(Semaphore::new(size));
        let delay = self.cfg.startup_delay();
        let mut workers = JoinSet::new();
        let mut slots = Vec::with_capacity(size);

        for resource in resources {
            let (tx, rx) = oneshot::channel();
            let worker = Worker::new(
                resource,
                Arc::clone(&reducer),
                delay,
                self.bus.clone(),
                Arc::clone(&pool),
            );
            workers.spawn(worker.run(tx));
            slots.push(Slot { resource, rx });
        }

        Ok(Launched {
            slots,
            workers,
            pool,
        })
    }

    /// Folds every slot in submission order, then completes the run.
    pub async fn drain(&self, launched: Launched, aggregator: &Aggregator) -> RunOutcome {
        let Launched {
            slots,
            mut workers,
            pool,
        } = launched;

        let deadline = Instant::now() + self.cfg.deadline;
        self.phase.send_replace(RunPhase::Draining);
        self.bus
            .publish(Event::new(EventKind::DrainStarted).with_timeout(self.cfg.deadline));

        let mut failures = Vec::new();
        for slot in slots {
            let result = self.await_slot(slot, deadline).await;
            if let Err(e) = &result.outcome {
                failures.push(e.clone());
            }
            aggregator.fold(&result).await;
        }

        pool.close();
        workers.detach_all();
        self.phase.send_replace(RunPhase::Completed);

        let total = aggregator.seal().await;
        let sequence = aggregator.snapshot_sequence().await;
        self.bus.publish(
            Event::new(EventKind::RunCompleted)
                .with_total(total)
                .with_count(failures.len()),
        );
        RunOutcome::new(total, sequence, failures)
    }

    /// Takes slot's result, waiting at most until `deadline`.
    async fn await_slot(&self, slot: Slot, deadline: Instant) -> PartialResult {
        let Slot { resource, mut rx } = slot;

        match rx.try_recv() {
            Ok(result) => return result,
            Err(oneshot::error::TryRecvError::Closed) => return vanished(resource),
            Err(oneshot::error::TryRecvError::Empty) => {}
        }

        if Instant::now() < deadline {
            match time::timeout_at(deadline, &mut rx).await {
                Ok(Ok(result)) => return result,
                Ok(Err(_)) => return vanished(resource),
                Err(_elapsed) => {}
            }
        }

        // closing refuses later sends (the worker reports ResultDiscarded);
        // a value that landed before the close is still taken
        rx.close();
        if let Ok(result) = rx.try_recv() {
            return result;
        }

        self.bus.publish(
            Event::new(EventKind::TimeoutHit)
                .with_resource(resource)
                .with_timeout(self.cfg.deadline),
        );
        PartialResult {
            resource,
            outcome: Err(ResourceError::Timeout {
                resource,
                deadline: self.cfg.deadline,
            }),
        }
    }
}

/// Result for a worker whose slot closed without a value.
fn vanished(resource: ResourceId) -> PartialResult {
    PartialResult {
        resource,
        outcome: Err(ResourceError::Panicked {
            resource,
            error: "worker exited without reporting".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ReducerFn;
    use std::time::Duration;

    fn scheduler(deadline: Duration) -> (Scheduler, watch::Receiver<RunPhase>, Bus) {
        let bus = Bus::new(256);
        let (tx, rx) = watch::channel(RunPhase::Idle);
        let cfg = Config::default()
            .with_max_delay(Duration::ZERO)
            .with_deadline(deadline);
        (Scheduler::new(cfg, bus.clone(), tx), rx, bus)
    }

    /// Resource k finishes after `delays[k-1]` seconds with value `values[k-1]`.
    fn timed(delays: &'static [u64], values: &'static [u64]) -> ReducerRef {
        ReducerFn::arc("timed", move |id: ResourceId| async move {
            let k = id.index() - 1;
            time::sleep(Duration::from_secs(delays[k])).await;
            Ok::<u64, ResourceError>(values[k])
        })
    }

    #[tokio::test(start_paused = true)]
    async fn folds_follow_submission_order_not_completion_order() {
        let (sched, phase, bus) = scheduler(Duration::from_secs(60));
        let (agg, _live) = Aggregator::new(bus);

        // resource 3 finishes first, resource 1 last
        let launched = sched
            .launch(ResourceId::range(3), timed(&[3, 2, 1], &[2, 10, 8]))
            .unwrap();
        assert_eq!(*phase.borrow(), RunPhase::Running);

        let outcome = sched.drain(launched, &agg).await;
        assert_eq!(outcome.sequence(), &[2, 12, 20]);
        assert_eq!(outcome.total(), 20);
        assert_eq!(outcome.failed_count(), 0);
        assert_eq!(*phase.borrow(), RunPhase::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_shared_across_slots() {
        let (sched, _phase, bus) = scheduler(Duration::from_secs(10));
        let (agg, _live) = Aggregator::new(bus);

        let launched = sched
            .launch(ResourceId::range(4), timed(&[1, 100, 100, 100], &[2, 4, 6, 8]))
            .unwrap();

        let started = Instant::now();
        let outcome = sched.drain(launched, &agg).await;

        // three stragglers time out within one deadline, not three
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11));
        assert_eq!(outcome.total(), 2);
        assert_eq!(outcome.timed_out(), 3);
        let timed_out: Vec<_> = outcome.failures().iter().map(|e| e.resource()).collect();
        assert_eq!(
            timed_out,
            vec![ResourceId::new(2), ResourceId::new(3), ResourceId::new(4)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn filled_slots_are_taken_after_the_deadline() {
        let (sched, _phase, bus) = scheduler(Duration::from_secs(10));
        let (agg, _live) = Aggregator::new(bus);

        // resource 1 stalls past the deadline, resources 2 and 3 are done long before it
        let launched = sched
            .launch(ResourceId::range(3), timed(&[100, 1, 2], &[2, 4, 6]))
            .unwrap();
        let outcome = sched.drain(launched, &agg).await;

        assert_eq!(outcome.total(), 10);
        assert_eq!(outcome.sequence(), &[4, 10]);
        assert_eq!(outcome.timed_out(), 1);
    }

    fn partial(index: usize, value: u64) -> PartialResult {
        PartialResult {
            resource: ResourceId::new(index),
            outcome: Ok(value),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_slot_refuses_late_sends() {
        let (sched, _phase, _bus) = scheduler(Duration::from_secs(1));
        let (tx, rx) = oneshot::channel();
        let slot = Slot {
            resource: ResourceId::new(1),
            rx,
        };

        let result = sched.await_slot(slot, Instant::now()).await;
        assert!(matches!(result.outcome, Err(ResourceError::Timeout { .. })));
        assert!(tx.send(partial(1, 2)).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn result_sent_at_the_deadline_is_folded_or_refused() {
        let (sched, _phase, _bus) = scheduler(Duration::from_secs(1));
        let deadline = Instant::now() + Duration::from_secs(5);
        let (tx, rx) = oneshot::channel();
        let slot = Slot {
            resource: ResourceId::new(1),
            rx,
        };

        let sender = tokio::spawn(async move {
            time::sleep_until(deadline).await;
            tx.send(partial(1, 4)).is_ok()
        });
        let result = sched.await_slot(slot, deadline).await;
        let delivered = sender.await.unwrap();

        // a value accepted by the slot is never dropped unreported
        if delivered {
            assert_eq!(result.outcome, Ok(4));
        } else {
            assert!(matches!(result.outcome, Err(ResourceError::Timeout { .. })));
        }
    }

    #[tokio::test]
    async fn empty_run_completes_with_zero() {
        let (sched, phase, bus) = scheduler(Duration::from_secs(1));
        let (agg, _live) = Aggregator::new(bus);

        let launched = sched.launch(Vec::new(), timed(&[], &[])).unwrap();
        let outcome = sched.drain(launched, &agg).await;

        assert_eq!(outcome.total(), 0);
        assert!(outcome.sequence().is_empty());
        assert_eq!(*phase.borrow(), RunPhase::Completed);
    }

    #[test]
    fn launch_outside_runtime_fails() {
        let (sched, _phase, _bus) = scheduler(Duration::from_secs(1));
        let err = sched
            .launch(ResourceId::range(1), timed(&[0], &[2]))
            .err()
            .unwrap();
        assert_eq!(err, RuntimeError::NoRuntime);
    }
}
