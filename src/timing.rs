//! Detection Timing
//!
//! Wall-clock instrumentation around the comparator. Timing never changes the
//! detection result.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::comparator::is_injection;

/// Detection result with the time it took to compute
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimedDetection {
    /// Elapsed wall time in milliseconds
    pub elapsed_ms: f64,
    /// Whether the runtime query diverged from the template
    pub detected: bool,
}

impl From<TimedDetection> for (f64, bool) {
    fn from(timed: TimedDetection) -> Self {
        (timed.elapsed_ms, timed.detected)
    }
}

/// Convert a duration to fractional milliseconds
pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Run `f` and return its result with the elapsed time
pub fn measure<T>(f: impl FnOnce() -> T) -> (Duration, T) {
    let start = Instant::now();
    let result = f();
    (start.elapsed(), result)
}

/// Time a single `is_injection` call, returning `(elapsed_ms, detected)`
pub fn timed_is_injection(static_query: &str, runtime_query: &str) -> (f64, bool) {
    time_detection(static_query, runtime_query).into()
}

/// Time a single `is_injection` call
pub fn time_detection(static_query: &str, runtime_query: &str) -> TimedDetection {
    let (elapsed, detected) = measure(|| is_injection(static_query, runtime_query));
    TimedDetection {
        elapsed_ms: duration_ms(elapsed),
        detected,
    }
}

/// Run `warmup` discarded detections, then time one more.
///
/// The first call pays for compiling the normalizer patterns; warmup keeps that
/// cost out of the measurement.
pub fn measure_with_warmup(
    static_query: &str,
    runtime_query: &str,
    warmup: u32,
) -> (Duration, bool) {
    for _ in 0..warmup {
        std::hint::black_box(is_injection(
            std::hint::black_box(static_query),
            std::hint::black_box(runtime_query),
        ));
    }
    measure(|| is_injection(static_query, runtime_query))
}

/// Time a detection after `warmup` discarded calls
pub fn time_with_warmup(static_query: &str, runtime_query: &str, warmup: u32) -> TimedDetection {
    let (elapsed, detected) = measure_with_warmup(static_query, runtime_query, warmup);
    TimedDetection {
        elapsed_ms: duration_ms(elapsed),
        detected,
    }
}

/// Time the check of a normal query and of an injected query against the same
/// template, returning `(normal_ms, injected_ms)`
pub fn compare_timings(static_query: &str, normal_query: &str, injected_query: &str) -> (f64, f64) {
    compare_timings_with_warmup(static_query, normal_query, injected_query, 0)
}

/// [`compare_timings`] with `warmup` discarded calls before each measured one
pub fn compare_timings_with_warmup(
    static_query: &str,
    normal_query: &str,
    injected_query: &str,
    warmup: u32,
) -> (f64, f64) {
    let normal = time_with_warmup(static_query, normal_query, warmup);
    let injected = time_with_warmup(static_query, injected_query, warmup);
    (normal.elapsed_ms, injected.elapsed_ms)
}
