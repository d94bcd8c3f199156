//! Queue implementation
//!
//! ## Layout
//!
//! - `store`: arrival-ordered items plus the drained flag
//! - `waiters`: FIFO registry of parked consumers, one private signal each
//! - `handoff`: [`HandoffQueue`], the lock and the wakeup protocol coupling
//!   the two
//! - `builder`: [`Builder`] for naming and sizing a queue
//!
//! ## Operation costs
//!
//! | Operation | Cost | Blocks |
//! |-----------|------|--------|
//! | `enqueue` | O(1) amortized | no |
//! | `dequeue` | O(1) amortized, O(waiting) on the fast path | until an item is available |
//! | `try_dequeue` | O(waiting) | no |
//! | `size` / `waiting` / `visited` | O(1) | no |
//!
//! ## Example
//!
//! ```rust
//! use handoff::queue::HandoffQueue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(HandoffQueue::new());
//! let workers: Vec<_> = (0..4)
//!     .map(|_| {
//!         let queue = Arc::clone(&queue);
//!         thread::spawn(move || queue.dequeue())
//!     })
//!     .collect();
//!
//! for job in 0..4 {
//!     queue.enqueue(job);
//! }
//!
//! let mut done: Vec<i32> = workers.into_iter().map(|w| w.join().unwrap()).collect();
//! done.sort();
//! assert_eq!(done, vec![0, 1, 2, 3]);
//! ```
mod builder;
mod handoff;
mod store;
mod waiters;

pub use builder::Builder;
pub use handoff::{HandoffQueue, QueueStats};


#[cfg(all(test, not(loom)))]
mod proptests;
