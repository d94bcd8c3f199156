//! Queue configuration

use super::handoff::HandoffQueue;

const DEFAULT_NAME: &str = "handoff";

/// Configures and creates a [`HandoffQueue`].
///
/// ```rust
/// use handoff::Builder;
///
/// let queue = Builder::new()
///     .name("jobs")
///     .initial_capacity(256)
///     .metrics(false)
///     .build::<u64>();
///
/// assert_eq!(queue.name(), "jobs");
/// assert_eq!(queue.size(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    pub(crate) name: &'static str,
    pub(crate) initial_capacity: usize,
    pub(crate) metrics: bool,
}

impl Builder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME,
            initial_capacity: 0,
            metrics: true,
        }
    }

    /// Label attached to every log event emitted by the queue
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Pre-size the item store. This is an allocation hint, not a bound:
    /// the queue never rejects an enqueue.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Enable or disable metrics collection from the start
    pub fn metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    /// Create the queue
    pub fn build<T>(self) -> HandoffQueue<T> {
        HandoffQueue::with_builder(self)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
