//! Error types used by the evensum runtime and by resource reducers.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: errors that prevent a whole run from starting or finishing.
//! - [`ResourceError`]: per-resource failures (I/O, parsing, timeout, panic).
//!
//! Resource errors are **isolated**: they are counted, published as events and
//! contribute `0` to the running total. Only a [`RuntimeError`] aborts a run.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::time::Duration;
use thiserror::Error;

use crate::resources::ResourceId;

/// # Errors produced by the evensum runtime.
///
/// These represent failures of the orchestration itself, such as being unable
/// to build the worker pool.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The run was started outside of a tokio runtime; no worker pool can be created.
    #[error("no tokio runtime available to host the worker pool")]
    NoRuntime,

    /// The resource count exceeds what a single pool can hold.
    #[error("worker pool of size {requested} exceeds the limit of {limit}")]
    PoolExhausted {
        /// Number of workers requested (one per resource).
        requested: usize,
        /// Maximum pool size supported.
        limit: usize,
    },

    /// The drain loop itself terminated abnormally.
    #[error("drain aborted: {reason}")]
    DrainAborted {
        /// Description of the failure.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use evensum::RuntimeError;
    ///
    /// let err = RuntimeError::PoolExhausted { requested: 10, limit: 4 };
    /// assert_eq!(err.as_label(), "runtime_pool_exhausted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NoRuntime => "runtime_no_runtime",
            RuntimeError::PoolExhausted { .. } => "runtime_pool_exhausted",
            RuntimeError::DrainAborted { .. } => "runtime_drain_aborted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::NoRuntime => "no tokio runtime".to_string(),
            RuntimeError::PoolExhausted { requested, limit } => {
                format!("pool size {requested} over limit {limit}")
            }
            RuntimeError::DrainAborted { reason } => format!("drain aborted: {reason}"),
        }
    }
}

/// # Errors produced while reducing a single resource.
///
/// Each variant names the resource it belongs to. None of them is retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The resource could not be read.
    #[error("{resource}: io failure: {error}")]
    Io {
        /// Resource that failed.
        resource: ResourceId,
        /// The underlying error message.
        error: String,
    },

    /// The resource contains a malformed numeric token (or its sum overflows).
    #[error("{resource}: parse failure at line {line}: {reason}")]
    Parse {
        /// Resource that failed.
        resource: ResourceId,
        /// 1-based line number of the offending token.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// The worker did not report before the global deadline.
    #[error("{resource}: no result within {deadline:?}")]
    Timeout {
        /// Resource whose worker was abandoned.
        resource: ResourceId,
        /// The global deadline that was exhausted.
        deadline: Duration,
    },

    /// The reducer panicked or its worker vanished without reporting.
    #[error("{resource}: worker panicked: {error}")]
    Panicked {
        /// Resource that failed.
        resource: ResourceId,
        /// Panic payload, when it was a string.
        error: String,
    },
}

impl ResourceError {
    /// Returns the resource this error belongs to.
    pub fn resource(&self) -> ResourceId {
        match self {
            ResourceError::Io { resource, .. }
            | ResourceError::Parse { resource, .. }
            | ResourceError::Timeout { resource, .. }
            | ResourceError::Panicked { resource, .. } => *resource,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use evensum::{ResourceError, ResourceId};
    ///
    /// let err = ResourceError::Timeout { resource: ResourceId::new(1), deadline: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "resource_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ResourceError::Io { .. } => "resource_io",
            ResourceError::Parse { .. } => "resource_parse",
            ResourceError::Timeout { .. } => "resource_timeout",
            ResourceError::Panicked { .. } => "resource_panicked",
        }
    }

    /// Returns a human-readable message without the resource prefix.
    pub fn as_message(&self) -> String {
        match self {
            ResourceError::Io { error, .. } => format!("io: {error}"),
            ResourceError::Parse { line, reason, .. } => format!("parse: line {line}: {reason}"),
            ResourceError::Timeout { deadline, .. } => format!("timeout: {deadline:?}"),
            ResourceError::Panicked { error, .. } => format!("panicked: {error}"),
        }
    }

    /// True when the worker was abandoned at the deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ResourceError::Timeout { .. })
    }
}
