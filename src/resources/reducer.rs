//! # Reducer abstraction and closure-backed implementation.
//!
//! A reducer turns one resource into the sum of its positive even values.
//! The runtime only invokes it; how the resource is stored is the reducer's concern.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ResourceError;
use crate::resources::ResourceId;

/// Shared handle to a reducer.
pub type ReducerRef = Arc<dyn Reduce>;

/// # Computes the partial sum of one resource.
///
/// Contract: return the sum of the values that are strictly positive and even.
/// An empty resource, or one where every value is filtered out, yields `Ok(0)`.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use evensum::{Reduce, ResourceError, ResourceId};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl Reduce for Fixed {
///     fn name(&self) -> &str { "fixed" }
///
///     async fn reduce(&self, _resource: ResourceId) -> Result<u64, ResourceError> {
///         Ok(42)
///     }
/// }
/// ```
#[async_trait]
pub trait Reduce: Send + Sync + 'static {
    /// Returns a stable, human-readable reducer name.
    fn name(&self) -> &str;

    /// Reduces one resource.
    async fn reduce(&self, resource: ResourceId) -> Result<u64, ResourceError>;
}

/// Closure-backed reducer.
///
/// Wraps `F: Fn(ResourceId) -> Fut`, producing a fresh future per call.
#[derive(Debug)]
pub struct ReducerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ReducerFn<F> {
    /// Creates a new closure-backed reducer.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the reducer and returns it as a shared handle.
    ///
    /// ```rust
    /// use evensum::{ReducerFn, ReducerRef, ResourceError, ResourceId};
    ///
    /// let r: ReducerRef = ReducerFn::arc("constant", |_id: ResourceId| async {
    ///     Ok::<u64, ResourceError>(4)
    /// });
    /// assert_eq!(r.name(), "constant");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Reduce for ReducerFn<F>
where
    F: Fn(ResourceId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<u64, ResourceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn reduce(&self, resource: ResourceId) -> Result<u64, ResourceError> {
        (self.f)(resource).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_receives_the_resource() {
        let r: ReducerRef = ReducerFn::arc("double", |id: ResourceId| async move {
            Ok::<u64, ResourceError>(id.index() as u64 * 2)
        });
        assert_eq!(r.reduce(ResourceId::new(21)).await, Ok(42));
    }
}
