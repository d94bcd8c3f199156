//! Arrival-ordered item storage.
//!
//! `ItemStore` knows nothing about threads. It keeps items in FIFO order and
//! tracks the `drained` flag the controller uses to make wakeups
//! edge-triggered: the flag is raised whenever a removal leaves the store
//! with zero items and lowered by the enqueue that refills it.

use std::collections::VecDeque;

#[derive(Debug)]
pub(crate) struct ItemStore<T> {
    items: VecDeque<T>,
    drained: bool,
}

impl<T> ItemStore<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            drained: true,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the last removal left the store empty and no enqueue has
    /// refilled it since.
    #[inline]
    pub(crate) fn is_drained(&self) -> bool {
        self.drained
    }

    /// Appends an item. Does not touch the drained flag; see
    /// [`ItemStore::take_drained`].
    #[inline]
    pub(crate) fn push_back(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Lowers the drained flag and reports whether it was raised.
    #[inline]
    pub(crate) fn take_drained(&mut self) -> bool {
        std::mem::replace(&mut self.drained, false)
    }

    /// Removes the head item.
    ///
    /// # Panics
    ///
    /// Panics if the store is empty. Callers only pop after a wakeup that
    /// guarantees a head item, so an empty store here is a broken invariant.
    pub(crate) fn pop_front(&mut self) -> T {
        let item = match self.items.pop_front() {
            Some(item) => item,
            None => invariant_violated("pop_front on an empty item store", 0, 0),
        };
        self.mark_if_empty();
        item
    }

    /// Removes the item at `index`, counting from the head.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub(crate) fn remove_at(&mut self, index: usize) -> T {
        let len = self.items.len();
        let item = match self.items.remove(index) {
            Some(item) => item,
            None => invariant_violated("remove_at past the end of the item store", index, len),
        };
        self.mark_if_empty();
        item
    }

    /// Empties the store, returning the items in arrival order.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        let items: Vec<T> = self.items.drain(..).collect();
        self.drained = true;
        items
    }

    #[inline]
    fn mark_if_empty(&mut self) {
        if self.items.is_empty() {
            self.drained = true;
        }
    }
}

#[cold]
#[inline(never)]
fn invariant_violated(what: &str, index: usize, len: usize) -> ! {
    panic!("handoff invariant violated: {what} (index {index}, len {len})")
}
