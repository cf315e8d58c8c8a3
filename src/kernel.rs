//! Range scan kernel: one work item per covered cell.

use crate::engine::ParallelEngine;
use crate::error::IndexError;
use crate::grid::GridGeometry;
use crate::output::OutputBuffer;
use crate::types::{RowId, Segment};

/// What a dispatch covered; logged per query by the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub segments: usize,
    pub cells: usize,
}

/// Run the scan over `segments`, appending every non-sentinel slot to
/// `buffer` as `(query_tag, row_id)`.
///
/// Each work item maps its cell back to a table index with the same
/// geometry that produced the segments. Cells past the end of the table
/// (only reachable through a malformed segment) are skipped.
pub fn dispatch<E: ParallelEngine>(
    engine: &E,
    table: &E::Table,
    sentinel: RowId,
    geometry: &GridGeometry,
    segments: &[Segment],
    buffer: &OutputBuffer,
) -> Result<DispatchStats, IndexError> {
    let slots = table.as_ref();
    if slots.len() != geometry.len() {
        return Err(IndexError::Engine(format!(
            "engine table has {} slots, grid expects {}",
            slots.len(),
            geometry.len()
        )));
    }

    engine.dispatch(segments, |x, y, query_tag| {
        if !geometry.contains(x, y) {
            return;
        }
        let candidate = slots[geometry.linear_of(x, y)];
        if candidate != sentinel {
            buffer.push(query_tag, candidate);
        }
    })?;

    Ok(DispatchStats {
        segments: segments.len(),
        cells: segments.iter().map(Segment::len).sum(),
    })
}
