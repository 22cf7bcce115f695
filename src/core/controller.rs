//! # RunController: starts runs and exposes their live and final totals.
//!
//! The [`RunController`] owns the event bus, the [`SubscriberSet`] and the
//! run configuration. Each call to [`start`](RunController::start) builds a
//! fresh [`Aggregator`] and [`Scheduler`], launches one worker per resource
//! and drains them on a background task.
//!
//! ## Wiring
//! ```text
//! start(resources, reducer)
//!   ├─► subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)   (once)
//!   ├─► Aggregator::new(bus)  ─► (Arc<Aggregator>, LiveTotals)
//!   ├─► Scheduler::launch()   ─► Running
//!   └─► spawn(Scheduler::drain(launched, aggregator)) ─► Draining ─► Completed
//!
//! shutdown()
//!   └─► stop listener (forwards what the bus already holds) ─► SubscriberSet::shutdown()
//!
//! RunHandle
//!   ├─ take_live()  ─► LiveTotals (ordered snapshots, ends at completion)
//!   ├─ total()      ─► Total::Partial(v) / Total::Final(v)
//!   ├─ phase()      ─► RunPhase
//!   └─ wait()       ─► RunOutcome
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use evensum::{Config, ReducerFn, ReducerRef, ResourceError, ResourceId, RunController};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default().with_max_delay(Duration::from_millis(10));
//!     let ctl = RunController::builder(cfg).build();
//!
//!     let reducer: ReducerRef = ReducerFn::arc("index", |id: ResourceId| async move {
//!         Ok::<u64, ResourceError>(id.index() as u64 * 2)
//!     });
//!
//!     let mut run = ctl.start(ResourceId::range(3), reducer)?;
//!     let mut live = run.take_live().expect("live totals");
//!     while let Some(total) = live.next().await {
//!         println!("{total}");
//!     }
//!     let outcome = run.wait().await?;
//!     assert_eq!(outcome.total(), 12);
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, OnceLock};

use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::core::aggregator::{Aggregator, LiveTotals};
use crate::core::builder::RunControllerBuilder;
use crate::core::outcome::{RunOutcome, RunPhase, Total};
use crate::core::scheduler::Scheduler;
use crate::error::RuntimeError;
use crate::events::Bus;
use crate::resources::{ReducerRef, ResourceId};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Starts runs and fans their events out to subscribers.
pub struct RunController {
    cfg: Config,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    subs: OnceLock<Listener>,
}

/// Bus listener feeding the subscriber set.
struct Listener {
    set: Arc<SubscriberSet>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RunController {
    /// Returns a builder for a controller with the given config.
    pub fn builder(cfg: Config) -> RunControllerBuilder {
        RunControllerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            subscribers,
            subs: OnceLock::new(),
        }
    }

    /// Run configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Event bus shared by every run of this controller.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Starts a run over `resources`, in that submission order.
    ///
    /// Returns as soon as every worker is submitted; the drain runs in the
    /// background. Fails only when the worker pool cannot be created.
    pub fn start(
        &self,
        resources: Vec<ResourceId>,
        reducer: ReducerRef,
    ) -> Result<RunHandle, RuntimeError> {
        let rt = tokio::runtime::Handle::try_current().map_err(|_| RuntimeError::NoRuntime)?;
        self.subscriber_listener();

        let (phase_tx, phase_rx) = watch::channel(RunPhase::Idle);
        let (aggregator, live) = Aggregator::new(self.bus.clone());
        let scheduler = Scheduler::new(self.cfg.clone(), self.bus.clone(), phase_tx);
        let launched = scheduler.launch(resources, reducer)?;

        let agg = Arc::clone(&aggregator);
        let drain = rt.spawn(async move { scheduler.drain(launched, &agg).await });

        Ok(RunHandle {
            live: Some(live),
            aggregator,
            phase: phase_rx,
            drain,
        })
    }

    /// Starts a run and waits for its outcome.
    pub async fn run(
        &self,
        resources: Vec<ResourceId>,
        reducer: ReducerRef,
    ) -> Result<RunOutcome, RuntimeError> {
        self.start(resources, reducer)?.wait().await
    }

    /// Stops event delivery and waits for every subscriber to process its queue.
    ///
    /// Events already published are delivered; events published afterwards
    /// (e.g. by abandoned workers) are not.
    pub async fn shutdown(self) {
        let Some(listener) = self.subs.into_inner() else {
            return;
        };
        let _ = listener.stop.send(());
        let _ = listener.task.await;
        // the listener task held the only other reference
        if let Ok(set) = Arc::try_unwrap(listener.set) {
            set.shutdown().await;
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set (once per controller).
    fn subscriber_listener(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        self.subs.get_or_init(|| {
            let set = Arc::new(SubscriberSet::new(
                self.subscribers.clone(),
                self.bus.clone(),
            ));
            let mut rx = self.bus.subscribe();
            let (stop, mut stopped) = oneshot::channel();
            let fanout = Arc::clone(&set);
            let task = tokio::spawn(async move {
                loop {
                    tokio::select! {
                        biased;
                        msg = rx.recv() => match msg {
                            Ok(ev) => fanout.emit(&ev),
                            Err(broadcast::error::RecvError::Lagged(_)) => continue,
                            Err(broadcast::error::RecvError::Closed) => break,
                        },
                        _ = &mut stopped => {
                            loop {
                                match rx.try_recv() {
                                    Ok(ev) => fanout.emit(&ev),
                                    Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                                    Err(_) => break,
                                }
                            }
                            break;
                        }
                    }
                }
            });
            Listener { set, stop, task }
        });
    }
}

/// Handle of one run.
pub struct RunHandle {
    live: Option<LiveTotals>,
    aggregator: Arc<Aggregator>,
    phase: watch::Receiver<RunPhase>,
    drain: JoinHandle<RunOutcome>,
}

impl RunHandle {
    /// Takes the live totals consumer. Returns `None` on later calls.
    pub fn take_live(&mut self) -> Option<LiveTotals> {
        self.live.take()
    }

    /// Current scheduler phase.
    pub fn phase(&self) -> RunPhase {
        *self.phase.borrow()
    }

    /// Current running total; [`Total::Partial`] until the run completes.
    pub async fn total(&self) -> Total {
        self.aggregator.total().await
    }

    /// Shared aggregator of this run; stays readable after [`wait`](Self::wait).
    pub fn aggregator(&self) -> Arc<Aggregator> {
        Arc::clone(&self.aggregator)
    }

    /// Snapshots folded so far.
    pub async fn snapshot_sequence(&self) -> Vec<u128> {
        self.aggregator.snapshot_sequence().await
    }

    /// Waits for the drain to complete and returns the outcome.
    pub async fn wait(self) -> Result<RunOutcome, RuntimeError> {
        self.drain.await.map_err(|e| RuntimeError::DrainAborted {
            reason: e.to_string(),
        })
    }
}
