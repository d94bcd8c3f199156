//! Fair blocking MPMC handoff queue
//!
//! A single lock guards both the item store and the registry of parked
//! consumers, so every decision below sees both counts together.
//!
//! ## Reservation
//!
//! While `n` consumers are parked, the first `n` items in the store belong
//! to them in park order. A consumer that arrives later, whether blocking or
//! not, may only take the item at index `n` and must park if there is none.
//! Without this, a stream of polling consumers could keep draining the head
//! of the store ahead of parked consumers that were woken for those items.
//!
//! ## Wakeups
//!
//! An enqueue signals the oldest parked consumer only when it refills a
//! drained store. A woken consumer takes the head item, leaves the registry,
//! and signals the next parked consumer if an item is still present. So
//! there is one wakeup per deliverable item and never one without an item.

use super::builder::Builder;
use super::store::ItemStore;
use super::waiters::{Ticket, WaiterId, WaiterRegistry};
use crate::metrics::{AtomicMetrics, MetricsCollector, QueueMetrics};
use crate::sync::{Mutex, MutexGuard};
use crate::{Error, Result};
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

struct State<T> {
    items: ItemStore<T>,
    waiters: WaiterRegistry,
    visited: usize,
}

impl<T> State<T> {
    /// Items a newly arriving consumer is allowed to take.
    #[inline]
    fn unreserved(&self) -> usize {
        self.items.len().saturating_sub(self.waiters.len())
    }
}

type Guard<'a, T> = MutexGuard<'a, State<T>>;

/// One consistent reading of a queue's counters, taken under its lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Items currently stored
    pub size: usize,
    /// Consumers currently parked in a blocking dequeue
    pub waiting: usize,
    /// Dequeues completed over the queue's lifetime
    pub visited: usize,
}

/// An unbounded multi-producer, multi-consumer FIFO queue whose blocking
/// consumers are served strictly in the order they parked.
///
/// Producers never block. [`dequeue`](Self::dequeue) parks the caller until
/// an item is available for it; [`try_dequeue`](Self::try_dequeue) never
/// parks and never takes an item reserved for a parked consumer.
///
/// # Examples
///
/// ```rust
/// use handoff::HandoffQueue;
/// use std::sync::Arc;
/// use std::thread;
///
/// let queue = Arc::new(HandoffQueue::new());
///
/// let consumer = {
///     let queue = Arc::clone(&queue);
///     thread::spawn(move || queue.dequeue())
/// };
///
/// queue.enqueue("job");
/// assert_eq!(consumer.join().unwrap(), "job");
/// assert_eq!(queue.visited(), 1);
/// ```
pub struct HandoffQueue<T> {
    state: Mutex<State<T>>,
    name: &'static str,
    metrics: AtomicMetrics,
    metrics_enabled: AtomicBool,
}

impl<T> HandoffQueue<T> {
    /// Create an empty queue with default settings
    pub fn new() -> Self {
        Builder::new().build()
    }

    pub(crate) fn with_builder(builder: Builder) -> Self {
        Self {
            state: Mutex::new(State {
                items: ItemStore::with_capacity(builder.initial_capacity),
                waiters: WaiterRegistry::new(),
                visited: 0,
            }),
            name: builder.name,
            metrics: AtomicMetrics::default(),
            metrics_enabled: AtomicBool::new(builder.metrics),
        }
    }

    /// The label this queue attaches to its log events
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append an item. Never blocks.
    ///
    /// If this refills a drained store and a consumer is parked, the oldest
    /// parked consumer is woken.
    pub fn enqueue(&self, item: T) {
        let mut state = self.state.lock();
        debug_assert_eq!(state.items.is_drained(), state.items.is_empty());
        state.items.push_back(item);
        let len = state.items.len();

        // take_drained must run on every enqueue to lower the flag.
        if state.items.take_drained() && state.waiters.signal_front() {
            self.record(AtomicMetrics::record_edge_signal);
            debug!(
                queue = self.name,
                waiting = state.waiters.len(),
                "enqueue woke oldest waiter"
            );
        } else {
            trace!(queue = self.name, len, "enqueued");
        }
        drop(state);

        self.record(|m| m.record_enqueue(len));
    }

    /// Remove an item, parking until one is available for this caller.
    ///
    /// Callers that park are served in the order they parked.
    pub fn dequeue(&self) -> T {
        let mut state = self.state.lock();
        if state.unreserved() > 0 {
            return self.take_unreserved(&mut state);
        }

        let id = self.park(&mut state);
        self.take_reserved(&mut state, id)
    }

    /// Like [`dequeue`](Self::dequeue), but gives up at `deadline`.
    ///
    /// A caller that was already woken when the deadline passes still
    /// receives its item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no item was delivered in time.
    pub fn dequeue_deadline(&self, deadline: Instant) -> Result<T> {
        let mut state = self.state.lock();
        if state.unreserved() > 0 {
            return Ok(self.take_unreserved(&mut state));
        }

        match self.park_until(&mut state, deadline) {
            Some(id) => Ok(self.take_reserved(&mut state, id)),
            None => {
                let waiting = state.waiters.len();
                drop(state);

                self.record(AtomicMetrics::record_timeout);
                debug!(queue = self.name, waiting, "timed dequeue expired");
                Err(Error::Timeout)
            }
        }
    }

    /// Like [`dequeue`](Self::dequeue), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no item was delivered in time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use handoff::{Error, HandoffQueue};
    /// use std::time::Duration;
    ///
    /// let queue: HandoffQueue<u8> = HandoffQueue::new();
    /// assert_eq!(queue.dequeue_timeout(Duration::from_millis(5)), Err(Error::Timeout));
    /// assert_eq!(queue.waiting(), 0);
    /// ```
    pub fn dequeue_timeout(&self, timeout: Duration) -> Result<T> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.dequeue_deadline(deadline),
            None => Ok(self.dequeue()),
        }
    }

    /// Remove an unreserved item without parking.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] if the queue holds no items, [`Error::Reserved`] if
    /// every item present is reserved for a parked consumer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use handoff::{Error, HandoffQueue};
    ///
    /// let queue = HandoffQueue::new();
    /// assert_eq!(queue.try_take(), Err(Error::Empty));
    /// queue.enqueue(1);
    /// assert_eq!(queue.try_take(), Ok(1));
    /// ```
    pub fn try_take(&self) -> Result<T> {
        let mut state = self.state.lock();
        if state.unreserved() > 0 {
            return Ok(self.take_unreserved(&mut state));
        }

        let error = if state.items.is_empty() {
            Error::Empty
        } else {
            Error::Reserved {
                waiting: state.waiters.len(),
            }
        };
        drop(state);

        self.record(AtomicMetrics::record_try_miss);
        trace!(queue = self.name, %error, "non-blocking dequeue missed");
        Err(error)
    }

    /// Remove an unreserved item without parking, or `None` if there is none.
    pub fn try_dequeue(&self) -> Option<T> {
        self.try_take().ok()
    }

    /// Items currently stored. Advisory under concurrent use.
    pub fn size(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Alias for [`size`](Self::size)
    pub fn len(&self) -> usize {
        self.size()
    }

    /// Whether no items are stored. Advisory under concurrent use.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Consumers currently parked. Advisory under concurrent use.
    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Dequeues completed over the queue's lifetime. Failed non-blocking
    /// attempts and expired timed dequeues are not counted.
    pub fn visited(&self) -> usize {
        self.state.lock().visited
    }

    /// Size, waiting and visited counts read together
    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            size: state.items.len(),
            waiting: state.waiters.len(),
            visited: state.visited,
        }
    }

    /// Tear the queue down, returning undelivered items in arrival order
    pub fn into_items(self) -> Vec<T> {
        let items = self.state.lock().items.drain();
        debug!(queue = self.name, outstanding = items.len(), "queue torn down");
        items
    }

    /// Register the caller and sleep until it is signaled.
    fn park(&self, state: &mut Guard<'_, T>) -> WaiterId {
        let ticket = self.register(state);
        while !state.waiters.is_notified(ticket.id) {
            ticket.signal.wait(state);
        }
        ticket.id
    }

    /// Register the caller and sleep until it is signaled or `deadline`
    /// passes. On expiry an unsignaled caller leaves the registry.
    fn park_until(&self, state: &mut Guard<'_, T>, deadline: Instant) -> Option<WaiterId> {
        if Instant::now() >= deadline {
            return None;
        }

        let ticket = self.register(state);
        loop {
            if state.waiters.is_notified(ticket.id) {
                return Some(ticket.id);
            }
            if ticket.signal.wait_until(state, deadline).timed_out() {
                if state.waiters.is_notified(ticket.id) {
                    return Some(ticket.id);
                }
                // Unsignaled, so either not the head or the store is empty:
                // nobody else needs waking.
                state.waiters.remove(ticket.id);
                return None;
            }
        }
    }

    fn register(&self, state: &mut Guard<'_, T>) -> Ticket {
        let ticket = state.waiters.register();
        self.record(AtomicMetrics::record_park);
        debug!(
            queue = self.name,
            len = state.items.len(),
            waiting = state.waiters.len(),
            "consumer parked"
        );
        ticket
    }

    /// Deliver the head item to the woken head waiter `id` and pass the
    /// wakeup on if another item is waiting for the next consumer.
    fn take_reserved(&self, state: &mut Guard<'_, T>, id: WaiterId) -> T {
        let item = state.items.pop_front();
        let woken = state.waiters.pop_front();
        debug_assert_eq!(woken, id, "woken consumer was not the oldest waiter");

        if !state.items.is_empty() && state.waiters.signal_front() {
            self.record(AtomicMetrics::record_chained_signal);
            debug!(
                queue = self.name,
                len = state.items.len(),
                waiting = state.waiters.len(),
                "wakeup chained to next waiter"
            );
        }
        state.visited += 1;

        self.record(AtomicMetrics::record_parked_dequeue);
        item
    }

    /// Take the first item not reserved for a parked consumer.
    fn take_unreserved(&self, state: &mut Guard<'_, T>) -> T {
        let index = state.waiters.len();
        let item = state.items.remove_at(index);
        state.visited += 1;

        self.record(AtomicMetrics::record_fast_dequeue);
        trace!(queue = self.name, index, "fast path dequeue");
        item
    }

    #[inline]
    fn record(&self, f: impl FnOnce(&AtomicMetrics)) {
        if self.metrics_enabled.load(Ordering::Relaxed) {
            f(&self.metrics);
        }
    }
}

impl<T> Default for HandoffQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for HandoffQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("HandoffQueue")
            .field("name", &self.name)
            .field("size", &stats.size)
            .field("waiting", &stats.waiting)
            .field("visited", &stats.visited)
            .finish()
    }
}

impl<T> Drop for HandoffQueue<T> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        let waiters = state.waiters.clear();
        let items = state.items.drain();
        drop(state);

        debug_assert_eq!(waiters, 0, "queue dropped with parked consumers");
        if !items.is_empty() {
            debug!(
                queue = self.name,
                outstanding = items.len(),
                "dropping undelivered items"
            );
        }
    }
}

impl<T> MetricsCollector for HandoffQueue<T> {
    fn metrics(&self) -> QueueMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics_enabled.store(enabled, Ordering::Relaxed);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics_enabled.load(Ordering::Relaxed)
    }
}
