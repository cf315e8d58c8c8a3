//! Thread-pool engine: one rayon task per cell.

use std::panic::{self, AssertUnwindSafe};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::ParallelEngine;
use crate::error::IndexError;
use crate::lookup::LookupTable;
use crate::types::Segment;

/// Runs work items on the CPU.
///
/// With the `parallel` feature, cells are spread over rayon's global pool or
/// a dedicated pool from [`CpuEngine::with_threads`]. Without it, dispatch is
/// a plain loop over the same cells.
pub struct CpuEngine {
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl CpuEngine {
    /// Engine on the global rayon pool.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    /// Engine with its own pool of `threads` workers (0 = rayon's default).
    ///
    /// Without the `parallel` feature the thread count is ignored.
    pub fn with_threads(threads: usize) -> Result<Self, IndexError> {
        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("raster-index-{}", i))
                .build()
                .map_err(|e| IndexError::Engine(format!("thread pool: {}", e)))?;
            Ok(Self { pool: Some(pool) })
        }
        #[cfg(not(feature = "parallel"))]
        {
            let _ = threads;
            Ok(Self::new())
        }
    }

    /// Worker threads available to a dispatch.
    pub fn threads(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            match &self.pool {
                Some(pool) => pool.current_num_threads(),
                None => rayon::current_num_threads(),
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    fn run_cells<K>(segments: &[Segment], kernel: &K)
    where
        K: Fn(u32, u32, u32) + Sync,
    {
        maybe_par_iter!(segments).for_each(|seg| {
            maybe_par_range!(seg.x_start..seg.x_end).for_each(|x| kernel(x, seg.y, seg.query_tag));
        });
    }
}

impl Default for CpuEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuEngine")
            .field("threads", &self.threads())
            .finish()
    }
}

impl ParallelEngine for CpuEngine {
    type Table = LookupTable;

    fn name(&self) -> &str {
        if cfg!(feature = "parallel") {
            "cpu-rayon"
        } else {
            "cpu-sequential"
        }
    }

    fn upload(&self, table: LookupTable) -> Result<Self::Table, IndexError> {
        // Host memory is already engine memory.
        Ok(table)
    }

    fn dispatch<K>(&self, segments: &[Segment], kernel: K) -> Result<(), IndexError>
    where
        K: Fn(u32, u32, u32) + Sync,
    {
        let run = || Self::run_cells(segments, &kernel);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            #[cfg(feature = "parallel")]
            {
                match &self.pool {
                    Some(pool) => pool.install(run),
                    None => run(),
                }
            }
            #[cfg(not(feature = "parallel"))]
            {
                run()
            }
        }));

        result.map_err(|payload| {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            IndexError::Engine(format!("work item panicked: {}", msg))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn visit_counts(
        engine: &CpuEngine,
        segments: &[Segment],
        width: usize,
        cells: usize,
    ) -> Vec<usize> {
        let hits: Vec<AtomicUsize> = (0..cells).map(|_| AtomicUsize::new(0)).collect();
        engine
            .dispatch(segments, |x, y, _tag| {
                hits[x as usize + y as usize * width].fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        hits.into_iter().map(AtomicUsize::into_inner).collect()
    }

    #[test]
    fn test_every_cell_visited_once() {
        let segments = vec![
            Segment::new(0, 3, 10, 0),
            Segment::new(1, 0, 10, 0),
            Segment::new(2, 0, 4, 0),
        ];
        let counts = visit_counts(&CpuEngine::new(), &segments, 10, 30);
        for (i, &c) in counts.iter().enumerate() {
            let expected = usize::from((3..24).contains(&i));
            assert_eq!(c, expected, "cell {}", i);
        }
    }

    #[test]
    fn test_dedicated_pool_matches_global() {
        let segments = vec![Segment::new(0, 0, 64, 0), Segment::new(1, 0, 64, 1)];
        let engine = CpuEngine::with_threads(2).unwrap();
        let counts = visit_counts(&engine, &segments, 64, 128);
        assert!(counts.iter().all(|&c| c == 1));
        if cfg!(feature = "parallel") {
            assert_eq!(engine.threads(), 2);
        }
    }

    #[test]
    fn test_query_tag_reaches_kernel() {
        let segments = vec![Segment::new(0, 0, 2, 4), Segment::new(0, 2, 3, 9)];
        let tags: Vec<AtomicUsize> = (0..3).map(|_| AtomicUsize::new(usize::MAX)).collect();
        CpuEngine::new()
            .dispatch(&segments, |x, _y, tag| {
                tags[x as usize].store(tag as usize, Ordering::Relaxed);
            })
            .unwrap();
        let tags: Vec<usize> = tags.into_iter().map(AtomicUsize::into_inner).collect();
        assert_eq!(tags, vec![4, 4, 9]);
    }

    #[test]
    fn test_worker_panic_becomes_engine_error() {
        let segments = vec![Segment::new(0, 0, 8, 0)];
        let err = CpuEngine::new()
            .dispatch(&segments, |x, _, _| {
                if x == 5 {
                    panic!("bad cell");
                }
            })
            .unwrap_err();
        match err {
            IndexError::Engine(msg) => assert!(msg.contains("bad cell"), "{}", msg),
            other => panic!("expected engine error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_dispatch_is_noop() {
        CpuEngine::new()
            .dispatch(&[], |_, _, _| panic!("no cells to visit"))
            .unwrap();
    }
}
