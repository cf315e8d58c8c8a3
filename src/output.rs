//! Bounded lock-free append log written by scan work items.
//!
//! One `fetch_add` on a shared counter reserves a slot per match; the slot is
//! written only if it is below capacity. Reservations past the end are still
//! counted, so after the dispatch the counter tells how many matches existed
//! and `counter > capacity` means some were dropped.
//!
//! Slots are `AtomicU64` holding a packed [`OutputRecord`]. Each slot has a
//! single writer (its reserver), so relaxed stores suffice; the engine's
//! dispatch barrier publishes them to the reading thread.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::types::{OutputRecord, RowId};

/// Fixed-capacity output buffer plus its atomic slot counter.
pub struct OutputBuffer {
    slots: Box<[AtomicU64]>,
    counter: AtomicUsize,
    overflowed: AtomicBool,
}

impl OutputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| AtomicU64::new(0)).collect();
        Self {
            slots,
            counter: AtomicUsize::new(0),
            overflowed: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Rewind for another dispatch. Slot contents are left in place; only
    /// the first `counter` slots are ever read back.
    pub fn reset(&mut self) {
        *self.counter.get_mut() = 0;
        *self.overflowed.get_mut() = false;
    }

    /// Reserve a slot and write `(query_tag, row_id)` into it.
    ///
    /// Returns `false` if the reservation landed past capacity and the record
    /// was discarded.
    #[inline]
    pub fn push(&self, query_tag: u32, row_id: RowId) -> bool {
        let slot = self.counter.fetch_add(1, Ordering::Relaxed);
        match self.slots.get(slot) {
            Some(cell) => {
                cell.store(OutputRecord { query_tag, row_id }.pack(), Ordering::Relaxed);
                true
            }
            None => {
                self.overflowed.store(true, Ordering::Relaxed);
                false
            }
        }
    }

    /// Number of slots reserved so far. May exceed [`capacity`](Self::capacity).
    #[inline]
    pub fn counter(&self) -> usize {
        self.counter.load(Ordering::Acquire)
    }

    #[inline]
    pub fn overflowed(&self) -> bool {
        self.overflowed.load(Ordering::Acquire)
    }

    /// Records in `[0, min(counter, capacity))`.
    ///
    /// Only meaningful after the dispatch that filled the buffer returned.
    pub fn records(&self) -> impl Iterator<Item = OutputRecord> + '_ {
        let n = self.counter().min(self.capacity());
        self.slots[..n]
            .iter()
            .map(|cell| OutputRecord::unpack(cell.load(Ordering::Acquire)))
    }
}

impl std::fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("capacity", &self.capacity())
            .field("counter", &self.counter())
            .field("overflowed", &self.overflowed())
            .finish()
    }
}
