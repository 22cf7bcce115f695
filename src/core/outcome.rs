//! # Results flowing out of workers and out of a run.
//!
//! - [`PartialResult`]: one worker's value or failure, moved through its slot
//! - [`RunPhase`]: scheduler state (`Idle → Running → Draining → Completed`)
//! - [`Total`]: the running total, labeled partial or final
//! - [`RunOutcome`]: immutable result of a completed run

use crate::error::ResourceError;
use crate::resources::ResourceId;

/// One worker's result for its resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialResult {
    /// Resource the worker was responsible for.
    pub resource: ResourceId,
    /// Partial sum, or why there is none.
    pub outcome: Result<u64, ResourceError>,
}

impl PartialResult {
    /// Contribution to the running total (`0` on failure).
    #[inline]
    pub fn contribution(&self) -> u64 {
        self.outcome.as_ref().copied().unwrap_or(0)
    }
}

/// Scheduler state.
///
/// ```text
/// Idle ──► Running ──► Draining ──► Completed
///        (workers     (deadline     (pool closed,
///         submitted)   running)      total sealed)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    /// Nothing submitted yet.
    Idle,
    /// Workers are being submitted to the pool.
    Running,
    /// Slots are folded in submission order under the global deadline.
    Draining,
    /// The outcome is final; late results are discarded.
    Completed,
}

/// Running total as seen by a caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Total {
    /// Run still in progress; the value may grow.
    Partial(u128),
    /// Run completed; the value never changes again.
    Final(u128),
}

impl Total {
    /// Returns the value regardless of the label.
    pub fn value(self) -> u128 {
        match self {
            Total::Partial(v) | Total::Final(v) => v,
        }
    }

    /// True once the run completed.
    pub fn is_final(self) -> bool {
        matches!(self, Total::Final(_))
    }
}

/// Outcome of a completed run.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    total: u128,
    sequence: Vec<u128>,
    failures: Vec<ResourceError>,
}

impl RunOutcome {
    pub(crate) fn new(total: u128, sequence: Vec<u128>, failures: Vec<ResourceError>) -> Self {
        Self {
            total,
            sequence,
            failures,
        }
    }

    /// Final running total.
    pub fn total(&self) -> u128 {
        self.total
    }

    /// Every snapshot of the running total, in fold order.
    pub fn sequence(&self) -> &[u128] {
        &self.sequence
    }

    /// Number of resources folded successfully.
    pub fn folded(&self) -> usize {
        self.sequence.len()
    }

    /// Per-resource failures in submission order.
    pub fn failures(&self) -> &[ResourceError] {
        &self.failures
    }

    /// Number of resources that failed or timed out.
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of resources abandoned at the deadline.
    pub fn timed_out(&self) -> usize {
        self.failures.iter().filter(|e| e.is_timeout()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_contributes_zero() {
        let result = PartialResult {
            resource: ResourceId::new(1),
            outcome: Err(ResourceError::Io {
                resource: ResourceId::new(1),
                error: "missing".into(),
            }),
        };
        assert_eq!(result.contribution(), 0);
    }

    #[test]
    fn total_labels() {
        assert!(!Total::Partial(3).is_final());
        assert!(Total::Final(3).is_final());
        assert_eq!(Total::Partial(3).value(), Total::Final(3).value());
    }
}
