use std::time::Duration;

/// Dummy timer when `timing` is disabled (zero-sized).
pub struct Timer;

impl Timer {
    #[inline(always)]
    pub fn start() -> Self {
        Self
    }

    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        Duration::ZERO
    }
}

/// Dummy build timings when `timing` is disabled (zero-sized).
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildTimings;

impl BuildTimings {
    #[inline(always)]
    pub fn set_table(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn set_upload(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn report(&self, _len: usize) {}
}

/// Dummy query timings when `timing` is disabled (zero-sized).
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTimings;

impl QueryTimings {
    #[inline(always)]
    pub fn report(&self, _queries: usize, _cells: usize) {}
}

/// Dummy builder when `timing` is disabled.
pub struct QueryTimingBuilder;

impl QueryTimingBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }

    #[inline(always)]
    pub fn set_decompose(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn set_dispatch(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn set_collect(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn finish(self) -> QueryTimings {
        QueryTimings
    }
}
