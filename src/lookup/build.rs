//! Table construction.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::LookupTable;
use crate::error::{ConstructionError, IndexError};
use crate::types::{Entry, RowId};

impl LookupTable {
    /// Build the table from `entries`.
    ///
    /// Keys are padded by one on each side. When several entries share a key
    /// the last one in input order wins.
    pub fn build(entries: &[Entry], sentinel: RowId) -> Result<Self, IndexError> {
        if entries.is_empty() {
            return Err(ConstructionError::EmptyDataset.into());
        }
        if let Some(position) = entries.iter().position(|e| e.row_id == sentinel) {
            return Err(ConstructionError::SentinelRowId { position }.into());
        }

        let (lo, hi) = key_bounds(entries);
        let min_key = lo as i64 - 1;
        let max_key = hi as i64 + 1;
        let span = (max_key - min_key + 1) as u64;
        if span > u32::MAX as u64 {
            return Err(ConstructionError::KeySpanTooLarge { span }.into());
        }

        let mut slots = vec![sentinel; span as usize].into_boxed_slice();
        // Sequential scatter: input order decides duplicate keys.
        for e in entries {
            slots[(e.key as i64 - min_key) as usize] = e.row_id;
        }

        let occupied = count_occupied(&slots, sentinel);

        Ok(Self {
            slots,
            min_key,
            sentinel,
            occupied,
        })
    }
}

/// Smallest and largest key (unpadded).
fn key_bounds(entries: &[Entry]) -> (i32, i32) {
    #[cfg(feature = "parallel")]
    {
        entries
            .par_iter()
            .map(|e| (e.key, e.key))
            .reduce(
                || (i32::MAX, i32::MIN),
                |a, b| (a.0.min(b.0), a.1.max(b.1)),
            )
    }
    #[cfg(not(feature = "parallel"))]
    {
        entries
            .iter()
            .fold((i32::MAX, i32::MIN), |acc, e| {
                (acc.0.min(e.key), acc.1.max(e.key))
            })
    }
}

fn count_occupied(slots: &[RowId], sentinel: RowId) -> usize {
    #[cfg(feature = "parallel")]
    {
        slots.par_iter().filter(|&&row| row != sentinel).count()
    }
    #[cfg(not(feature = "parallel"))]
    {
        slots.iter().filter(|&&row| row != sentinel).count()
    }
}
