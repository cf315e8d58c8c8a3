//! Range → row segment decomposition.

use std::ops::Range;

use crate::types::Segment;

/// Split the linear range `[range.start, range.end)` into row segments on a
/// grid of `width` cells per row.
///
/// At most three shapes appear: a partial first row, any number of full
/// middle rows, and a partial last row. The segments' cell counts sum to
/// `range.len()`; an empty range yields no segments.
pub fn decompose_range(range: Range<usize>, width: u32, query_tag: u32) -> Vec<Segment> {
    let mut out = Vec::new();
    decompose_range_into(range, width, query_tag, &mut out);
    out
}

/// Like [`decompose_range`], appending to `out`.
pub fn decompose_range_into(
    range: Range<usize>,
    width: u32,
    query_tag: u32,
    out: &mut Vec<Segment>,
) {
    debug_assert!(width > 0, "grid width must be non-zero");
    debug_assert!(range.start <= range.end, "inverted range {:?}", range);
    if range.start >= range.end {
        return;
    }

    let w = width as usize;
    let start_y = range.start / w;
    let start_x = (range.start % w) as u32;
    let end_y = range.end / w;
    let end_x = (range.end % w) as u32;

    out.reserve(end_y - start_y + 1);
    for y in start_y..=end_y {
        let (x_start, x_end) = if y == start_y && y == end_y {
            (start_x, end_x)
        } else if y == start_y {
            (start_x, width)
        } else if y == end_y {
            // `end` on a row boundary leaves nothing in the last row.
            if end_x == 0 {
                continue;
            }
            (0, end_x)
        } else {
            (0, width)
        };
        out.push(Segment::new(y as u32, x_start, x_end, query_tag));
    }
}

/// Decompose several ranges into one segment list; range `i` is tagged `i`.
pub fn decompose_batch(ranges: &[Range<usize>], width: u32) -> Vec<Segment> {
    let mut out = Vec::new();
    for (tag, range) in ranges.iter().enumerate() {
        decompose_range_into(range.clone(), width, tag as u32, &mut out);
    }
    out
}

#[cfg(test)]
#[path = "decompose_tests.rs"]
mod decompose_tests;
