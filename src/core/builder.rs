use std::sync::Arc;

use crate::config::Config;
use crate::subscribers::Subscribe;

use super::controller::RunController;

/// Builder for constructing a [`RunController`].
pub struct RunControllerBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl RunControllerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (worker lifecycle, folds, timeouts)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the controller.
    ///
    /// Nothing is spawned here; subscriber workers start with the first run,
    /// so a controller can be built outside of a tokio runtime.
    pub fn build(self) -> RunController {
        RunController::new_internal(self.cfg, self.subscribers)
    }
}
