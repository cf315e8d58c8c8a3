//! Fixed-width 2D execution grid over the linear table.
//!
//! Linear index `i` lives at cell `(i mod W, i div W)`. [`GridGeometry`] owns
//! both directions of that mapping, and the scan kernel uses its inverse to
//! turn a work item's cell back into a table index. The decomposer and
//! [`Segment::cells`](crate::Segment::cells) apply the same arithmetic a row
//! at a time from the width alone; tests pin them to `cell_of`/`linear_of`.

mod decompose;

pub use decompose::{decompose_batch, decompose_range, decompose_range_into};

use crate::error::{ConstructionError, IndexError};

/// Shape of the grid a table of `len` slots is laid out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    width: u32,
    height: u32,
    len: usize,
}

impl GridGeometry {
    /// Lay out `len` slots in rows of `width` cells.
    ///
    /// `len` must fit in `u32` (the lookup table guarantees it).
    pub fn new(len: usize, width: u32) -> Result<Self, IndexError> {
        if width == 0 {
            return Err(ConstructionError::ZeroWidth.into());
        }
        let height = len.div_ceil(width as usize);
        let height = u32::try_from(height).map_err(|_| ConstructionError::KeySpanTooLarge {
            span: len as u64,
        })?;
        Ok(Self { width, height, len })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of table slots mapped onto the grid.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cells in the full rectangle; the last row may extend past `len`.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Forward mapping: linear index → `(x, y)`.
    #[inline]
    pub fn cell_of(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// Inverse mapping: `(x, y)` → linear index.
    #[inline]
    pub fn linear_of(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }

    /// True if `(x, y)` maps to a slot inside the table.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && self.linear_of(x, y) < self.len
    }
}
