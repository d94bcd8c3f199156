//! Queue metrics
//!
//! Lock-free counters describing how a [`HandoffQueue`](crate::HandoffQueue)
//! is being used: how often consumers take the fast path versus parking, how
//! many wakeups the protocol issues, and how many timed waits expire. The
//! counters are advisory. They are updated outside the protocol's decisions
//! and never influence them.

use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Point-in-time snapshot of a queue's counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueMetrics {
    /// Items enqueued
    pub enqueues: u64,
    /// Dequeues that found an unreserved item without parking
    pub fast_dequeues: u64,
    /// Dequeues completed by a consumer that parked first
    pub parked_dequeues: u64,
    /// Non-blocking dequeues that found nothing they were allowed to take
    pub try_misses: u64,
    /// Times a consumer registered itself and went to sleep
    pub parks: u64,
    /// Wakeups issued by an enqueue refilling a drained store
    pub edge_signals: u64,
    /// Wakeups handed from one woken consumer to the next
    pub chained_signals: u64,
    /// Timed dequeues that gave up
    pub timeouts: u64,
    /// Largest item count observed right after an enqueue
    pub peak_len: usize,
}

impl QueueMetrics {
    /// Total completed dequeues
    pub fn dequeues(&self) -> u64 {
        self.fast_dequeues + self.parked_dequeues
    }

    /// Share of completed dequeues that had to park, as a percentage
    pub fn park_rate(&self) -> f64 {
        percentage(self.parked_dequeues, self.dequeues())
    }

    /// Share of completed dequeues served by the fast path, as a percentage
    pub fn fast_path_rate(&self) -> f64 {
        percentage(self.fast_dequeues, self.dequeues())
    }

    /// Wakeups issued in total
    pub fn signals(&self) -> u64 {
        self.edge_signals + self.chained_signals
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

/// Internal atomic counters
#[derive(Debug, Default)]
pub(crate) struct AtomicMetrics {
    enqueues: AtomicU64,
    fast_dequeues: AtomicU64,
    parked_dequeues: AtomicU64,
    try_misses: AtomicU64,
    parks: AtomicU64,
    edge_signals: AtomicU64,
    chained_signals: AtomicU64,
    timeouts: AtomicU64,
    peak_len: AtomicUsize,
}

impl AtomicMetrics {
    pub(crate) fn record_enqueue(&self, len: usize) {
        self.enqueues.fetch_add(1, Ordering::Relaxed);
        self.peak_len.fetch_max(len, Ordering::Relaxed);
    }

    pub(crate) fn record_fast_dequeue(&self) {
        self.fast_dequeues.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_parked_dequeue(&self) {
        self.parked_dequeues.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_try_miss(&self) {
        self.try_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_park(&self) {
        self.parks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_edge_signal(&self) {
        self.edge_signals.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_chained_signal(&self) {
        self.chained_signals.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> QueueMetrics {
        QueueMetrics {
            enqueues: self.enqueues.load(Ordering::Relaxed),
            fast_dequeues: self.fast_dequeues.load(Ordering::Relaxed),
            parked_dequeues: self.parked_dequeues.load(Ordering::Relaxed),
            try_misses: self.try_misses.load(Ordering::Relaxed),
            parks: self.parks.load(Ordering::Relaxed),
            edge_signals: self.edge_signals.load(Ordering::Relaxed),
            chained_signals: self.chained_signals.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            peak_len: self.peak_len.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.enqueues.store(0, Ordering::Relaxed);
        self.fast_dequeues.store(0, Ordering::Relaxed);
        self.parked_dequeues.store(0, Ordering::Relaxed);
        self.try_misses.store(0, Ordering::Relaxed);
        self.parks.store(0, Ordering::Relaxed);
        self.edge_signals.store(0, Ordering::Relaxed);
        self.chained_signals.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
        self.peak_len.store(0, Ordering::Relaxed);
    }
}

/// Access to a queue's park and wakeup counters
pub trait MetricsCollector {
    /// Snapshot of the protocol counters. Counters are read one by one, so
    /// under concurrent use the snapshot may straddle an operation.
    fn metrics(&self) -> QueueMetrics;

    /// Zero every counter, including the peak length
    fn reset_metrics(&self);

    /// Turn counting on or off. Queue behavior is unaffected.
    fn set_metrics_enabled(&self, enabled: bool);

    /// Whether operations are currently being counted
    fn is_metrics_enabled(&self) -> bool;
}
