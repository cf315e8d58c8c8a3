//! Range-membership index driven by data-parallel grid dispatch.
//!
//! Given a static set of `(key, row_id)` pairs, the index answers "which rows
//! have a key in `[a, b)`". Keys are stored in a dense lookup table laid out
//! on a fixed-width 2D grid; a query is split into row segments and every
//! covered cell is read by an independent work item, the way a rasterizer
//! would shade a line of pixels. Matches land in a bounded lock-free buffer
//! and are deduplicated after the dispatch barrier.
//!
//! # Example
//!
//! ```
//! use raster_index::{validation, Entry, IndexConfig, RangeIndex};
//!
//! let entries = vec![Entry::new(10, 0), Entry::new(12, 1), Entry::new(15, 2)];
//! let index = RangeIndex::build(&entries, IndexConfig::default()).expect("non-empty dataset");
//!
//! let rows = index.query(12..16).expect("bounds inside the key span");
//! assert_eq!(rows.to_sorted_vec(), vec![1, 2]);
//!
//! let report = validation::check(&entries, 12..16, &rows);
//! assert!(report.is_ok());
//! ```

mod collect;
mod error;
mod index;
mod kernel;
mod output;
mod types;
pub mod validation;

pub mod engine;
pub mod grid;
pub mod loader;
pub mod lookup;

// Internal modules
pub(crate) mod timing;

pub use collect::ResultSet;
pub use engine::{CpuEngine, ParallelEngine};
pub use error::{ConstructionError, IndexError, OverflowError, RangeError};
pub use grid::GridGeometry;
pub use index::RangeIndex;
pub use lookup::LookupTable;
pub use output::OutputBuffer;
pub use types::{entries_from_keys, Entry, OutputRecord, RowId, Segment, DEFAULT_SENTINEL};

/// Grid width used when none is configured.
pub const DEFAULT_WIDTH: u32 = 8192;

/// Construction-time configuration.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Cells per grid row.
    ///
    /// Wider rows mean fewer segments per query but longer partial rows at
    /// the range ends.
    pub width: u32,
    /// Maximum result slots per dispatch.
    ///
    /// `None` sizes each dispatch buffer to the number of cells it covers,
    /// so neither single queries nor batches can overflow. An explicit
    /// budget is shared by all queries of a batch.
    pub capacity: Option<usize>,
    /// Marker for empty table slots. No entry may use it as a row id.
    pub sentinel: RowId,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            capacity: None,
            sentinel: DEFAULT_SENTINEL,
        }
    }
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_sentinel(mut self, sentinel: RowId) -> Self {
        self.sentinel = sentinel;
        self
    }
}

/// Build an index on the default [`CpuEngine`] with default settings.
///
/// Errors are reserved for unusable datasets (empty, sentinel row ids, key
/// span too large).
pub fn build(entries: &[Entry]) -> Result<RangeIndex, IndexError> {
    build_with(entries, IndexConfig::default())
}

/// Build an index on the default [`CpuEngine`] with explicit configuration.
pub fn build_with(entries: &[Entry], config: IndexConfig) -> Result<RangeIndex, IndexError> {
    RangeIndex::build(entries, config)
}
