//! Execution engine abstraction.
//!
//! The index never touches threads directly. It hands the engine a read-only
//! table once, then asks it to run a kernel over the cells of a segment list.
//! An engine must:
//!
//! - make the uploaded table readable by linear index for the index lifetime;
//! - call the kernel exactly once per cell of every segment, in any order,
//!   from any thread;
//! - return from [`ParallelEngine::dispatch`] only after every kernel call
//!   has finished, so all writes made by the kernel are visible to the
//!   caller (the dispatch barrier).
//!
//! The shared atomic counter lives in the
//! [`OutputBuffer`](crate::output::OutputBuffer) the kernel captures.

/// Conditionally parallel iterator over a slice.
macro_rules! maybe_par_iter {
    ($slice:expr) => {{
        #[cfg(feature = "parallel")]
        {
            $slice.par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice.iter()
        }
    }};
}

/// Conditionally parallel iterator over a range.
macro_rules! maybe_par_range {
    ($range:expr) => {{
        #[cfg(feature = "parallel")]
        {
            ($range).into_par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $range
        }
    }};
}

mod cpu;

pub use cpu::CpuEngine;

use crate::error::IndexError;
use crate::lookup::LookupTable;
use crate::types::{RowId, Segment};

/// A data-parallel execution substrate.
pub trait ParallelEngine: Send + Sync {
    /// Engine-resident copy of the lookup table.
    type Table: AsRef<[RowId]> + Send + Sync;

    /// Short name for logs.
    fn name(&self) -> &str;

    /// Take ownership of the built table and make it readable by work items.
    fn upload(&self, table: LookupTable) -> Result<Self::Table, IndexError>;

    /// Run `kernel(x, y, query_tag)` once for every cell of every segment.
    ///
    /// Blocks until all work items have completed.
    fn dispatch<K>(&self, segments: &[Segment], kernel: K) -> Result<(), IndexError>
    where
        K: Fn(u32, u32, u32) + Sync;
}
