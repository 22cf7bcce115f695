//! # Resources and the reducers that turn them into partial sums.
//!
//! This module provides the resource-side types:
//! - [`ResourceId`] - opaque 1-based handle of one resource
//! - [`Reduce`] - trait for computing the positive-even sum of one resource
//! - [`ReducerFn`] - closure-backed reducer
//! - [`ReducerRef`] - shared reference to a reducer (`Arc<dyn Reduce>`)
//! - [`FileReducer`] - reads `resource<k>.txt` files from a directory
//!
//! Helpers used by file-backed reducers and the command line live in
//! [`parse`] (text grammar) and [`store`] (discovery and generation).

mod file;
pub mod parse;
mod reducer;
pub mod store;

use std::fmt;

pub use file::FileReducer;
pub use reducer::{Reduce, ReducerFn, ReducerRef};

/// Opaque handle of one resource.
///
/// Identifiers are 1-based indices; `Display` renders them as `resource#k`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(usize);

impl ResourceId {
    /// Wraps an index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the wrapped index.
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns `count` identifiers `1..=count`.
    ///
    /// ```
    /// use evensum::ResourceId;
    ///
    /// let ids = ResourceId::range(3);
    /// assert_eq!(ids.last().map(|id| id.index()), Some(3));
    /// ```
    pub fn range(count: usize) -> Vec<Self> {
        (1..=count).map(Self).collect()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource#{}", self.0)
    }
}
