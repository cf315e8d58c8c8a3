//! Zero-cost phase timings for index build and queries.
//!
//! With the `timing` feature, phases are measured and reported through
//! `tracing` at debug level. Without it, every type is zero-sized and every
//! method compiles away.

#[cfg(feature = "timing")]
mod real;
#[cfg(not(feature = "timing"))]
mod stub;

#[cfg(feature = "timing")]
pub use real::*;
#[cfg(not(feature = "timing"))]
pub use stub::*;
