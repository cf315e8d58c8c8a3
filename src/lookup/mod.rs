//! Dense key → row lookup table.
//!
//! One slot per key in the padded key span `[min_key, max_key]`, holding the
//! row id of the entry with that key or the sentinel. The span is widened by
//! one key on each side so boundary lookups stay inside the table.
//!
//! Built once, then read-only for the lifetime of the index.

mod build;

use crate::types::RowId;

/// Immutable key → row id array.
#[derive(Debug, Clone)]
pub struct LookupTable {
    /// `slots[key - min_key]` = row id or sentinel.
    /// Length: `max_key - min_key + 1`
    slots: Box<[RowId]>,
    /// Padded lower key bound (smallest observed key - 1).
    min_key: i64,
    sentinel: RowId,
    /// Number of non-sentinel slots.
    occupied: usize,
}

impl LookupTable {
    /// Number of slots, including padding.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Never true for a built table (construction rejects empty datasets).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Padded lower key bound; slot 0 represents this key.
    #[inline]
    pub fn min_key(&self) -> i64 {
        self.min_key
    }

    /// Padded upper key bound; the last slot represents this key.
    #[inline]
    pub fn max_key(&self) -> i64 {
        self.min_key + self.slots.len() as i64 - 1
    }

    #[inline]
    pub fn sentinel(&self) -> RowId {
        self.sentinel
    }

    /// Slots holding a row id. Duplicate keys collapse into one slot.
    #[inline]
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<RowId> {
        self.slots.get(index).copied()
    }

    /// Row stored for `key`, if any.
    pub fn lookup(&self, key: i64) -> Option<RowId> {
        self.index_of(key)
            .map(|i| self.slots[i])
            .filter(|&row| row != self.sentinel)
    }

    /// Slot index of `key`, or `None` outside the padded span.
    #[inline]
    pub fn index_of(&self, key: i64) -> Option<usize> {
        let offset = key.checked_sub(self.min_key)?;
        usize::try_from(offset).ok().filter(|&i| i < self.slots.len())
    }

    #[inline]
    pub fn as_slice(&self) -> &[RowId] {
        &self.slots
    }
}

impl AsRef<[RowId]> for LookupTable {
    fn as_ref(&self) -> &[RowId] {
        &self.slots
    }
}
