//! # handoff
//!
//! A fair, unbounded multi-producer, multi-consumer FIFO queue for handing
//! items between threads of one process.
//!
//! ## Features
//!
//! - **Non-blocking producers**: [`HandoffQueue::enqueue`] never waits
//! - **Blocking consumers served in park order**: [`HandoffQueue::dequeue`]
//!   parks the caller on its own private signal and wakes it in arrival order
//! - **Reservation**: items that have arrived for parked consumers cannot be
//!   taken by [`HandoffQueue::try_dequeue`] or by later arrivals
//! - **Bounded wakeups**: one wakeup per deliverable item, never a wakeup
//!   without an item to collect
//! - **Introspection**: [`HandoffQueue::size`], [`HandoffQueue::waiting`],
//!   [`HandoffQueue::visited`] and opt-out [`metrics`]
//!
//! ## Quick Start
//!
//! ```rust
//! use handoff::HandoffQueue;
//!
//! let queue = HandoffQueue::new();
//! queue.enqueue("a");
//! queue.enqueue("b");
//! assert_eq!(queue.dequeue(), "a");
//! assert_eq!(queue.dequeue(), "b");
//! assert_eq!(queue.size(), 0);
//! assert_eq!(queue.visited(), 2);
//! ```
//!
//! ## Thread Safety
//!
//! `HandoffQueue<T>` is `Send + Sync` whenever `T: Send`. Share it behind an
//! `Arc`. Ownership of an item passes to the queue at `enqueue` and to the
//! consumer that dequeues it; the queue never inspects items.
//!
//! ## Logging
//!
//! The queue emits [`tracing`] events (`trace` for the fast path, `debug`
//! for parking, wakeups and timeouts) tagged with the queue's name. It never
//! installs a subscriber.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod metrics;
pub mod queue;
mod sync;

pub use crate::metrics::{MetricsCollector, QueueMetrics};
pub use crate::queue::{Builder, HandoffQueue, QueueStats};

/// Error types for handoff operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The queue holds no items
    #[error("queue is empty")]
    Empty,
    /// Every item present is reserved for a parked consumer
    #[error("all items are reserved for {waiting} parked consumer(s)")]
    Reserved {
        /// Parked consumers at the time of the attempt
        waiting: usize,
    },
    /// A timed dequeue reached its deadline without receiving an item
    #[error("timed out waiting for an item")]
    Timeout,
}

/// Result type for handoff operations
pub type Result<T> = core::result::Result<T, Error>;
