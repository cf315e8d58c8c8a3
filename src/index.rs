//! The range index: table + geometry + engine, and the query entry points.

use std::ops::Range;

use crate::collect::{collect, collect_tagged, ResultSet};
use crate::engine::{CpuEngine, ParallelEngine};
use crate::error::{ConstructionError, IndexError, RangeError};
use crate::grid::{decompose_batch, decompose_range, GridGeometry};
use crate::kernel::{self, DispatchStats};
use crate::lookup::LookupTable;
use crate::output::OutputBuffer;
use crate::timing::{BuildTimings, QueryTimingBuilder, Timer};
use crate::types::{Entry, RowId, Segment};
use crate::IndexConfig;

/// Immutable range-membership index over one integer column.
///
/// Built once from a dataset; every query runs a fresh dispatch with its own
/// output buffer, so queries through `&self` may run concurrently.
pub struct RangeIndex<E: ParallelEngine = CpuEngine> {
    engine: E,
    table: E::Table,
    geometry: GridGeometry,
    /// Padded lower key bound: table slot 0.
    min_key: i64,
    sentinel: RowId,
    /// Distinct keys present.
    occupied: usize,
    /// Explicit slot budget per dispatch; `None` sizes each buffer to its cells.
    capacity: Option<usize>,
    config: IndexConfig,
}

impl RangeIndex<CpuEngine> {
    /// Build on a [`CpuEngine`] over the global thread pool.
    pub fn build(entries: &[Entry], config: IndexConfig) -> Result<Self, IndexError> {
        Self::build_with(CpuEngine::new(), entries, config)
    }
}

impl<E: ParallelEngine> RangeIndex<E> {
    /// Build the lookup table, lay it out on the grid and upload it to `engine`.
    pub fn build_with(
        engine: E,
        entries: &[Entry],
        config: IndexConfig,
    ) -> Result<Self, IndexError> {
        if config.width == 0 {
            return Err(ConstructionError::ZeroWidth.into());
        }
        let mut timings = BuildTimings::default();

        let t = Timer::start();
        let table = LookupTable::build(entries, config.sentinel)?;
        timings.set_table(t.elapsed());

        let geometry = GridGeometry::new(table.len(), config.width)?;
        let min_key = table.min_key();
        let occupied = table.occupied();
        let capacity = config.capacity;

        let t = Timer::start();
        let table = engine.upload(table)?;
        timings.set_upload(t.elapsed());
        timings.report(geometry.len());

        tracing::info!(
            engine = engine.name(),
            entries = entries.len(),
            distinct_keys = occupied,
            slots = geometry.len(),
            width = geometry.width(),
            height = geometry.height(),
            capacity = ?capacity,
            "built range index"
        );

        Ok(Self {
            engine,
            table,
            geometry,
            min_key,
            sentinel: config.sentinel,
            occupied,
            capacity,
            config,
        })
    }

    /// Rows whose key lies in `keys` (half-open).
    ///
    /// Both bounds must fall inside the padded key span
    /// `[min_key, max_key + 1]`, and `keys.start <= keys.end`.
    pub fn query(&self, keys: Range<i64>) -> Result<ResultSet, IndexError> {
        let range = self.linear_range(&keys)?;
        self.query_linear(range)
    }

    /// Rows stored in table slots `[range.start, range.end)`.
    ///
    /// Requires `range.start <= range.end <= table_len()`.
    pub fn query_linear(&self, range: Range<usize>) -> Result<ResultSet, IndexError> {
        self.check_linear(&range)?;

        let mut tb = QueryTimingBuilder::new();
        let t = Timer::start();
        let segments = decompose_range(range.clone(), self.geometry.width(), 0);
        tb.set_decompose(t.elapsed());

        let (buffer, stats) = self.run(&segments, &mut tb)?;

        let t = Timer::start();
        let result = collect(&buffer);
        tb.set_collect(t.elapsed());

        tb.finish().report(1, stats.cells);
        tracing::debug!(
            start = range.start,
            end = range.end,
            segments = stats.segments,
            cells = stats.cells,
            reserved = buffer.counter(),
            "range query"
        );
        result
    }

    /// Run several key ranges in one dispatch.
    ///
    /// Results come back in input order. An explicit capacity is shared by
    /// the whole batch; on overflow every query's partial set is returned in
    /// the error.
    pub fn query_batch(&self, ranges: &[Range<i64>]) -> Result<Vec<ResultSet>, IndexError> {
        if ranges.is_empty() {
            return Ok(Vec::new());
        }
        let linear = ranges
            .iter()
            .map(|keys| self.linear_range(keys))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tb = QueryTimingBuilder::new();
        let t = Timer::start();
        let segments = decompose_batch(&linear, self.geometry.width());
        tb.set_decompose(t.elapsed());

        let (buffer, stats) = self.run(&segments, &mut tb)?;

        let t = Timer::start();
        let result = collect_tagged(&buffer, ranges.len());
        tb.set_collect(t.elapsed());

        tb.finish().report(ranges.len(), stats.cells);
        tracing::debug!(
            queries = ranges.len(),
            segments = stats.segments,
            cells = stats.cells,
            reserved = buffer.counter(),
            "batched range query"
        );
        result
    }

    /// Dispatch `segments` into a fresh buffer.
    ///
    /// Every covered cell matches at most once, so a buffer of `cells` slots
    /// cannot overflow. Without an explicit capacity that is the size used;
    /// with one, the buffer is `min(capacity, cells)`.
    fn run(
        &self,
        segments: &[Segment],
        tb: &mut QueryTimingBuilder,
    ) -> Result<(OutputBuffer, DispatchStats), IndexError> {
        let cells: usize = segments.iter().map(Segment::len).sum();
        let slots = self.capacity.map_or(cells, |cap| cap.min(cells));
        let buffer = OutputBuffer::with_capacity(slots);

        let t = Timer::start();
        let stats = kernel::dispatch(
            &self.engine,
            &self.table,
            self.sentinel,
            &self.geometry,
            segments,
            &buffer,
        )?;
        tb.set_dispatch(t.elapsed());
        Ok((buffer, stats))
    }

    fn linear_range(&self, keys: &Range<i64>) -> Result<Range<usize>, RangeError> {
        let start = keys.start.saturating_sub(self.min_key);
        let end = keys.end.saturating_sub(self.min_key);
        let len = self.geometry.len();
        if start < 0 || start > end || end > len as i64 {
            return Err(RangeError { start, end, len });
        }
        Ok(start as usize..end as usize)
    }

    fn check_linear(&self, range: &Range<usize>) -> Result<(), RangeError> {
        let len = self.geometry.len();
        if range.start > range.end || range.end > len {
            return Err(RangeError {
                start: i64::try_from(range.start).unwrap_or(i64::MAX),
                end: i64::try_from(range.end).unwrap_or(i64::MAX),
                len,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Table slots, including the padding slot on each side.
    #[inline]
    pub fn table_len(&self) -> usize {
        self.geometry.len()
    }

    /// Padded lower key bound.
    #[inline]
    pub fn min_key(&self) -> i64 {
        self.min_key
    }

    /// Padded upper key bound.
    #[inline]
    pub fn max_key(&self) -> i64 {
        self.min_key + self.geometry.len() as i64 - 1
    }

    /// Distinct keys stored.
    #[inline]
    pub fn distinct_keys(&self) -> usize {
        self.occupied
    }

    /// Explicit result slot budget per dispatch, if one was configured.
    #[inline]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    #[inline]
    pub fn sentinel(&self) -> RowId {
        self.sentinel
    }

    #[inline]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine-resident table.
    #[inline]
    pub fn table(&self) -> &[RowId] {
        self.table.as_ref()
    }
}

impl<E: ParallelEngine> std::fmt::Debug for RangeIndex<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeIndex")
            .field("engine", &self.engine.name())
            .field("geometry", &self.geometry)
            .field("min_key", &self.min_key)
            .field("distinct_keys", &self.occupied)
            .field("capacity", &self.capacity)
            .finish()
    }
}
