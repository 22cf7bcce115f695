//! # Worker: one resource, one reducer call, one result.
//!
//! ```text
//! Worker::run(slot)
//!   ├─► acquire pool permit (pool size = resource count)
//!   ├─► sleep(StartupDelay::sample())          (tokio timer, never blocks siblings)
//!   ├─► publish WorkerStarting
//!   ├─► reducer.reduce(resource)  ── panic caught ──► ResourceError::Panicked
//!   ├─► publish WorkerFinished / WorkerFailed
//!   └─► slot.send(PartialResult)
//!          └─ slot gone (run completed) ──► publish ResultDiscarded
//! ```
//!
//! ## Rules
//! - Exactly one [`PartialResult`] per worker; nothing is retried.
//! - A failure never escapes the worker: it becomes a failed `PartialResult`.
//! - Workers are never cancelled; after completion their results are dropped.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Semaphore, oneshot};
use tokio::time;

use crate::core::outcome::PartialResult;
use crate::error::ResourceError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::StartupDelay;
use crate::resources::{ReducerRef, ResourceId};
use crate::subscribers::panic_message;

/// Executes the reducer for a single resource.
pub struct Worker {
    resource: ResourceId,
    reducer: ReducerRef,
    delay: StartupDelay,
    bus: Bus,
    pool: Arc<Semaphore>,
}

impl Worker {
    /// Creates a worker for `resource`.
    pub fn new(
        resource: ResourceId,
        reducer: ReducerRef,
        delay: StartupDelay,
        bus: Bus,
        pool: Arc<Semaphore>,
    ) -> Self {
        Self {
            resource,
            reducer,
            delay,
            bus,
            pool,
        }
    }

    /// Runs the worker and hands its result to `slot`.
    pub async fn run(self, slot: oneshot::Sender<PartialResult>) {
        let Ok(_permit) = self.pool.clone().acquire_owned().await else {
            // pool closed before this worker got a permit: the run is over
            self.publish_discarded();
            return;
        };

        let result = self.execute().await;
        if slot.send(result).is_err() {
            self.publish_discarded();
        }
    }

    /// Sleeps the startup delay, then reduces the resource.
    pub async fn execute(&self) -> PartialResult {
        let delay = self.delay.sample();
        if !delay.is_zero() {
            time::sleep(delay).await;
        }
        self.bus.publish(
            Event::new(EventKind::WorkerStarting)
                .with_resource(self.resource)
                .with_delay(delay),
        );

        let outcome = match AssertUnwindSafe(self.reducer.reduce(self.resource))
            .catch_unwind()
            .await
        {
            Ok(res) => res,
            Err(panic_err) => Err(ResourceError::Panicked {
                resource: self.resource,
                error: panic_message(&*panic_err),
            }),
        };

        match &outcome {
            Ok(value) => self.bus.publish(
                Event::new(EventKind::WorkerFinished)
                    .with_resource(self.resource)
                    .with_value(*value),
            ),
            Err(e) => self.bus.publish(
                Event::new(EventKind::WorkerFailed)
                    .with_resource(self.resource)
                    .with_reason(e.to_string()),
            ),
        }

        PartialResult {
            resource: self.resource,
            outcome,
        }
    }

    fn publish_discarded(&self) {
        self.bus
            .publish(Event::new(EventKind::ResultDiscarded).with_resource(self.resource));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ReducerFn;
    use std::time::Duration;

    fn worker(reducer: ReducerRef, delay: StartupDelay, bus: &Bus) -> Worker {
        Worker::new(
            ResourceId::new(1),
            reducer,
            delay,
            bus.clone(),
            Arc::new(Semaphore::new(1)),
        )
    }

    #[tokio::test]
    async fn reports_value_into_slot() {
        let bus = Bus::new(16);
        let r: ReducerRef =
            ReducerFn::arc("ten", |_id: ResourceId| async { Ok::<u64, ResourceError>(10) });
        let (tx, rx) = oneshot::channel();

        worker(r, StartupDelay::None, &bus).run(tx).await;

        let result = rx.await.unwrap();
        assert_eq!(result.outcome, Ok(10));
        assert_eq!(result.resource, ResourceId::new(1));
    }

    #[tokio::test]
    async fn panicking_reducer_becomes_a_failed_result() {
        let bus = Bus::new(16);
        let r: ReducerRef = ReducerFn::arc("boom", |_id: ResourceId| async {
            if true {
                panic!("corrupt resource");
            }
            Ok::<u64, ResourceError>(0)
        });

        let result = worker(r, StartupDelay::None, &bus).execute().await;
        match result.outcome {
            Err(ResourceError::Panicked { error, .. }) => assert!(error.contains("corrupt")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn startup_delay_precedes_the_reducer() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let r: ReducerRef =
            ReducerFn::arc("two", |_id: ResourceId| async { Ok::<u64, ResourceError>(2) });
        let delay = StartupDelay::Uniform {
            max: Duration::from_secs(4),
        };

        let started = time::Instant::now();
        let result = worker(r, delay, &bus).execute().await;
        assert_eq!(result.outcome, Ok(2));
        assert!(started.elapsed() < Duration::from_secs(4));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::WorkerStarting);
        assert!(ev.delay_ms.unwrap() < 4_000);
    }

    #[tokio::test]
    async fn dropped_slot_discards_the_result() {
        let bus = Bus::new(16);
        let mut events = bus.subscribe();
        let r: ReducerRef =
            ReducerFn::arc("four", |_id: ResourceId| async { Ok::<u64, ResourceError>(4) });
        let (tx, rx) = oneshot::channel();
        drop(rx);

        worker(r, StartupDelay::None, &bus).run(tx).await;

        let mut kinds = Vec::new();
        while let Ok(ev) = events.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(kinds.last(), Some(&EventKind::ResultDiscarded));
    }
}
