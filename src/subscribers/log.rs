//! # LogWriter: event to `tracing` bridge
//!
//! A subscriber that forwards incoming [`Event`]s to `tracing`, so the host
//! application decides where they end up (`tracing-subscriber`, JSON, ...).
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO evensum: run starting resources=3
//! DEBUG evensum: worker starting resource=resource#2 delay_ms=1200
//! INFO evensum: total folded resource=resource#1 value=2 total=2
//! WARN evensum: worker failed resource=resource#3 reason="parse failure ..."
//! WARN evensum: timeout hit resource=resource#4 timeout_ms=60000
//! INFO evensum: run completed total=12 failed=2
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let resource = e.resource.map(|r| r.to_string()).unwrap_or_default();
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::RunStarting => {
                info!(target: "evensum", resources = ?e.count, "run starting");
            }
            EventKind::DrainStarted => {
                info!(target: "evensum", timeout_ms = ?e.timeout_ms, "drain started");
            }
            EventKind::RunCompleted => {
                info!(target: "evensum", total = ?e.total, failed = ?e.count, "run completed");
            }
            EventKind::WorkerStarting => {
                debug!(target: "evensum", %resource, delay_ms = ?e.delay_ms, "worker starting");
            }
            EventKind::WorkerFinished => {
                debug!(target: "evensum", %resource, value = ?e.value, "worker finished");
            }
            EventKind::WorkerFailed => {
                warn!(target: "evensum", %resource, reason, "worker failed");
            }
            EventKind::TimeoutHit => {
                warn!(target: "evensum", %resource, timeout_ms = ?e.timeout_ms, "timeout hit");
            }
            EventKind::ResultDiscarded => {
                warn!(target: "evensum", %resource, "late result discarded");
            }
            EventKind::TotalFolded => {
                info!(
                    target: "evensum",
                    %resource,
                    value = ?e.value,
                    total = ?e.total,
                    "total folded"
                );
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "evensum", reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(target: "evensum", reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
