//! Property-based tests for the handoff queue using proptest
//!
//! Single-threaded operation sequences are replayed against a `VecDeque`
//! model. With no parked consumers every item is unreserved, so the queue
//! must behave exactly like a plain FIFO with counters.

use crate::metrics::MetricsCollector;
use crate::queue::HandoffQueue;
use crate::Error;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::time::Instant;

#[derive(Debug, Clone)]
enum Op {
    Enqueue(u32),
    Dequeue,
    TryDequeue,
    ExpiredDequeue,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u32>().prop_map(Op::Enqueue),
        1 => Just(Op::Dequeue),
        2 => Just(Op::TryDequeue),
        1 => Just(Op::ExpiredDequeue),
    ]
}

proptest! {
    #[test]
    fn test_matches_fifo_model(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let queue = HandoffQueue::new();
        let mut model = VecDeque::new();
        let mut visited = 0;

        for op in ops {
            match op {
                Op::Enqueue(value) => {
                    queue.enqueue(value);
                    model.push_back(value);
                }
                Op::Dequeue => {
                    // A blocking dequeue on an empty queue would never return.
                    if let Some(expected) = model.pop_front() {
                        prop_assert_eq!(queue.dequeue(), expected);
                        visited += 1;
                    }
                }
                Op::TryDequeue => match model.pop_front() {
                    Some(expected) => {
                        prop_assert_eq!(queue.try_take(), Ok(expected));
                        visited += 1;
                    }
                    None => prop_assert_eq!(queue.try_take(), Err(Error::Empty)),
                },
                Op::ExpiredDequeue => match model.pop_front() {
                    Some(expected) => {
                        prop_assert_eq!(queue.dequeue_deadline(Instant::now()), Ok(expected));
                        visited += 1;
                    }
                    None => {
                        prop_assert_eq!(queue.dequeue_deadline(Instant::now()), Err(Error::Timeout));
                    }
                },
            }

            prop_assert_eq!(queue.size(), model.len());
            prop_assert_eq!(queue.is_empty(), model.is_empty());
            prop_assert_eq!(queue.visited(), visited);
            prop_assert_eq!(queue.waiting(), 0);
        }

        prop_assert_eq!(queue.into_items(), Vec::from(model));
    }

    #[test]
    fn test_visited_is_monotonic(ops in prop::collection::vec(any::<bool>(), 1..200)) {
        let queue = HandoffQueue::new();
        let mut last = queue.visited();

        for (i, enqueue) in ops.into_iter().enumerate() {
            let before = queue.size();
            let taken = if enqueue {
                queue.enqueue(i);
                false
            } else {
                queue.try_dequeue().is_some()
            };

            let now = queue.visited();
            prop_assert!(now >= last);
            prop_assert_eq!(now - last, usize::from(taken));
            prop_assert_eq!(taken, !enqueue && before > 0);
            last = now;
        }
    }

    #[test]
    fn test_metrics_account_for_every_operation(
        values in prop::collection::vec(any::<u8>(), 0..100),
        extra_tries in 0usize..20,
    ) {
        let queue = HandoffQueue::new();
        for &value in &values {
            queue.enqueue(value);
        }
        for _ in 0..values.len() + extra_tries {
            let _ = queue.try_dequeue();
        }

        let metrics = queue.metrics();
        prop_assert_eq!(metrics.enqueues, values.len() as u64);
        prop_assert_eq!(metrics.fast_dequeues, values.len() as u64);
        prop_assert_eq!(metrics.try_misses, extra_tries as u64);
        prop_assert_eq!(metrics.peak_len, values.len());
        prop_assert_eq!(metrics.signals(), 0);
    }
}
