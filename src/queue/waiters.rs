//! FIFO registry of parked consumers.
//!
//! Every parked consumer owns a slot holding its private signal. Only the
//! head slot is ever signaled, and a signaled slot stays at the head until
//! its owner wakes and removes it, so wake order equals park order.

use crate::sync::{Arc, Condvar};
use std::collections::VecDeque;

/// Identity of one parked consumer, unique for the life of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WaiterId(u64);

/// What a parked consumer holds while it sleeps.
#[derive(Debug)]
pub(crate) struct Ticket {
    pub(crate) id: WaiterId,
    pub(crate) signal: Arc<Condvar>,
}

#[derive(Debug)]
struct WaiterSlot {
    id: WaiterId,
    notified: bool,
    signal: Arc<Condvar>,
}

#[derive(Debug, Default)]
pub(crate) struct WaiterRegistry {
    slots: VecDeque<WaiterSlot>,
    next_id: u64,
}

impl WaiterRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Appends a slot for the calling consumer.
    pub(crate) fn register(&mut self) -> Ticket {
        let id = WaiterId(self.next_id);
        self.next_id += 1;

        let signal = Arc::new(Condvar::new());
        self.slots.push_back(WaiterSlot {
            id,
            notified: false,
            signal: Arc::clone(&signal),
        });
        Ticket { id, signal }
    }

    /// Whether the slot `id` has been signaled. Unknown ids are not.
    pub(crate) fn is_notified(&self, id: WaiterId) -> bool {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .map_or(false, |slot| slot.notified)
    }

    /// Signals the head slot. Returns `false` when nobody is parked.
    ///
    /// The slot is not removed; its owner does that once it runs again.
    pub(crate) fn signal_front(&mut self) -> bool {
        match self.slots.front_mut() {
            Some(slot) => {
                slot.notified = true;
                slot.signal.notify_one();
                true
            }
            None => false,
        }
    }

    /// Removes the head slot.
    ///
    /// # Panics
    ///
    /// Panics if the registry is empty.
    pub(crate) fn pop_front(&mut self) -> WaiterId {
        match self.slots.pop_front() {
            Some(slot) => slot.id,
            None => panic!("handoff invariant violated: pop_front on an empty waiter registry"),
        }
    }

    /// Removes the slot `id` wherever it sits. Used by consumers that give
    /// up waiting before being signaled.
    pub(crate) fn remove(&mut self, id: WaiterId) -> bool {
        match self.slots.iter().position(|slot| slot.id == id) {
            Some(index) => {
                self.slots.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops every slot, returning how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.slots.len();
        self.slots.clear();
        count
    }
}
