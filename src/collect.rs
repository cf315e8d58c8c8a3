//! Harvest an [`OutputBuffer`] into deduplicated row sets.
//!
//! Runs strictly after the dispatch that filled the buffer has returned.

use rustc_hash::FxHashSet;

use crate::error::{IndexError, OverflowError};
use crate::output::OutputBuffer;
use crate::types::RowId;

/// Unique row ids matched by a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    rows: FxHashSet<RowId>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn contains(&self, row: RowId) -> bool {
        self.rows.contains(&row)
    }

    /// Returns `true` if the row was not present yet.
    #[inline]
    pub fn insert(&mut self, row: RowId) -> bool {
        self.rows.insert(row)
    }

    /// Iterate in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().copied()
    }

    pub fn to_sorted_vec(&self) -> Vec<RowId> {
        let mut rows: Vec<RowId> = self.rows.iter().copied().collect();
        rows.sort_unstable();
        rows
    }

    /// Rows in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a ResultSet) -> impl Iterator<Item = RowId> + 'a {
        self.rows.difference(&other.rows).copied()
    }
}

impl FromIterator<RowId> for ResultSet {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl Extend<RowId> for ResultSet {
    fn extend<I: IntoIterator<Item = RowId>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl IntoIterator for ResultSet {
    type Item = RowId;
    type IntoIter = std::collections::hash_set::IntoIter<RowId>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Collect all records of a single-query dispatch.
///
/// Overflow returns the clamped partial set inside [`IndexError::Overflow`].
pub fn collect(buffer: &OutputBuffer) -> Result<ResultSet, IndexError> {
    let rows: ResultSet = buffer.records().map(|r| r.row_id).collect();
    check_overflow(buffer, vec![rows]).map(|mut sets| sets.swap_remove(0))
}

/// Collect a batched dispatch into one set per query tag.
///
/// Records tagged `>= queries` are ignored.
pub fn collect_tagged(buffer: &OutputBuffer, queries: usize) -> Result<Vec<ResultSet>, IndexError> {
    let mut sets = vec![ResultSet::new(); queries];
    for rec in buffer.records() {
        if let Some(set) = sets.get_mut(rec.query_tag as usize) {
            set.insert(rec.row_id);
        }
    }
    check_overflow(buffer, sets)
}

fn check_overflow(
    buffer: &OutputBuffer,
    sets: Vec<ResultSet>,
) -> Result<Vec<ResultSet>, IndexError> {
    let reserved = buffer.counter();
    let capacity = buffer.capacity();
    if reserved > capacity {
        tracing::warn!(
            reserved,
            capacity,
            dropped = reserved - capacity,
            "output buffer overflow, returning partial result"
        );
        return Err(IndexError::Overflow(Box::new(OverflowError {
            reserved,
            capacity,
            partial: sets,
        })));
    }
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_deduplicates() {
        let buf = OutputBuffer::with_capacity(8);
        for row in [3, 1, 3, 2, 1] {
            buf.push(0, row);
        }
        let set = collect(&buf).unwrap();
        assert_eq!(set.to_sorted_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_collect_reports_overflow_with_partial() {
        let buf = OutputBuffer::with_capacity(2);
        for row in [7, 8, 9, 10] {
            buf.push(0, row);
        }
        let err = collect(&buf).unwrap_err();
        match &err {
            IndexError::Overflow(overflow) => {
                assert_eq!(overflow.reserved, 4);
                assert_eq!(overflow.capacity, 2);
                assert_eq!(overflow.partial.len(), 1);
                assert_eq!(overflow.partial[0].to_sorted_vec(), vec![7, 8]);
            }
            other => panic!("expected overflow, got {:?}", other),
        }
        assert_eq!(err.partial_results().map(|p| p[0].len()), Some(2));
    }

    #[test]
    fn test_exactly_full_is_not_overflow() {
        let buf = OutputBuffer::with_capacity(3);
        for row in [1, 2, 3] {
            buf.push(0, row);
        }
        assert_eq!(collect(&buf).unwrap().len(), 3);
    }

    #[test]
    fn test_collect_tagged_splits_by_tag() {
        let buf = OutputBuffer::with_capacity(8);
        buf.push(0, 1);
        buf.push(2, 5);
        buf.push(0, 2);
        buf.push(9, 100);
        let sets = collect_tagged(&buf, 3).unwrap();
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[0].to_sorted_vec(), vec![1, 2]);
        assert!(sets[1].is_empty());
        assert_eq!(sets[2].to_sorted_vec(), vec![5]);
    }

    #[test]
    fn test_result_set_difference() {
        let a: ResultSet = [1, 2, 3].into_iter().collect();
        let b: ResultSet = [2, 4].into_iter().collect();
        let mut d: Vec<RowId> = a.difference(&b).collect();
        d.sort_unstable();
        assert_eq!(d, vec![1, 3]);
    }
}
