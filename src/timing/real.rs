use std::time::{Duration, Instant};

/// Timer that tracks elapsed time when timing is enabled.
pub struct Timer(Instant);

impl Timer {
    #[inline]
    pub fn start() -> Self {
        Self(Instant::now())
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

#[inline]
fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Time spent building the index.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildTimings {
    pub table: Duration,
    pub upload: Duration,
}

impl BuildTimings {
    #[inline]
    pub fn set_table(&mut self, d: Duration) {
        self.table = d;
    }

    #[inline]
    pub fn set_upload(&mut self, d: Duration) {
        self.upload = d;
    }

    pub fn report(&self, len: usize) {
        tracing::debug!(
            target: "raster_index::timing",
            len,
            table_ms = ms(self.table),
            upload_ms = ms(self.upload),
            "build timings"
        );
    }
}

/// Time spent in each query phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTimings {
    pub decompose: Duration,
    pub dispatch: Duration,
    pub collect: Duration,
}

impl QueryTimings {
    pub fn total(&self) -> Duration {
        self.decompose + self.dispatch + self.collect
    }

    pub fn report(&self, queries: usize, cells: usize) {
        let total = self.total();
        let pct = |d: Duration| {
            if total.as_nanos() == 0 {
                0.0
            } else {
                d.as_secs_f64() / total.as_secs_f64() * 100.0
            }
        };
        tracing::debug!(
            target: "raster_index::timing",
            queries,
            cells,
            decompose_ms = ms(self.decompose),
            decompose_pct = pct(self.decompose),
            dispatch_ms = ms(self.dispatch),
            dispatch_pct = pct(self.dispatch),
            collect_ms = ms(self.collect),
            collect_pct = pct(self.collect),
            total_ms = ms(total),
            "query timings"
        );
    }
}

/// Accumulates query phase timings.
pub struct QueryTimingBuilder {
    timings: QueryTimings,
}

impl QueryTimingBuilder {
    pub fn new() -> Self {
        Self {
            timings: QueryTimings::default(),
        }
    }

    pub fn set_decompose(&mut self, d: Duration) {
        self.timings.decompose = d;
    }

    pub fn set_dispatch(&mut self, d: Duration) {
        self.timings.dispatch = d;
    }

    pub fn set_collect(&mut self, d: Duration) {
        self.timings.collect = d;
    }

    pub fn finish(self) -> QueryTimings {
        self.timings
    }
}
