//! Core record types shared by the table, the grid and the engine.

use bytemuck::{Pod, Zeroable};

/// Row identifier: the 0-based position of a record in the input.
pub type RowId = i32;

/// Default marker for "no row has this key".
pub const DEFAULT_SENTINEL: RowId = -1;

/// One input record.
///
/// `#[repr(C)]` so slices can be handed to an engine as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Entry {
    pub key: i32,
    pub row_id: RowId,
}

impl Entry {
    #[inline]
    pub const fn new(key: i32, row_id: RowId) -> Self {
        Self { key, row_id }
    }
}

impl From<(i32, RowId)> for Entry {
    #[inline]
    fn from((key, row_id): (i32, RowId)) -> Self {
        Self::new(key, row_id)
    }
}

/// Assign row ids by position to a sequence of keys.
pub fn entries_from_keys<I: IntoIterator<Item = i32>>(keys: I) -> Vec<Entry> {
    keys.into_iter()
        .enumerate()
        .map(|(row, key)| Entry::new(key, row as RowId))
        .collect()
}

/// A contiguous run `[x_start, x_end)` of cells in grid row `y`.
///
/// Segments produced for one query partition its linear range: no two share
/// a cell and their union is exactly the queried index set.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Segment {
    pub y: u32,
    pub x_start: u32,
    pub x_end: u32,
    /// Which query of a batch this segment belongs to.
    pub query_tag: u32,
}

impl Segment {
    #[inline]
    pub const fn new(y: u32, x_start: u32, x_end: u32, query_tag: u32) -> Self {
        Self {
            y,
            x_start,
            x_end,
            query_tag,
        }
    }

    /// Number of cells covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.x_end.saturating_sub(self.x_start) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x_end <= self.x_start
    }

    /// Linear table indices covered by this segment on a grid of `width`.
    pub fn cells(&self, width: u32) -> impl Iterator<Item = usize> {
        let row = self.y as usize * width as usize;
        (self.x_start as usize..self.x_end as usize).map(move |x| row + x)
    }
}

/// One match written by a work item: `(query_tag, row_id)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct OutputRecord {
    pub query_tag: u32,
    pub row_id: RowId,
}

impl OutputRecord {
    #[inline]
    pub(crate) fn pack(self) -> u64 {
        ((self.query_tag as u64) << 32) | (self.row_id as u32 as u64)
    }

    #[inline]
    pub(crate) fn unpack(bits: u64) -> Self {
        Self {
            query_tag: (bits >> 32) as u32,
            row_id: bits as u32 as RowId,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_record_pack_keeps_negative_rows() {
        let rec = OutputRecord {
            query_tag: 7,
            row_id: -5,
        };
        assert_eq!(OutputRecord::unpack(rec.pack()), rec);
    }

    #[test]
    fn test_segment_cells_are_row_major() {
        let seg = Segment::new(2, 3, 6, 0);
        let cells: Vec<usize> = seg.cells(10).collect();
        assert_eq!(cells, vec![23, 24, 25]);
        assert_eq!(seg.len(), 3);
        assert!(Segment::new(0, 4, 4, 0).is_empty());
    }

    #[test]
    fn test_entries_from_keys_numbers_rows_in_order() {
        let entries = entries_from_keys([5, 3, 5]);
        assert_eq!(
            entries,
            vec![Entry::new(5, 0), Entry::new(3, 1), Entry::new(5, 2)]
        );
    }
}
