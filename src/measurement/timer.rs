//! Wall-clock stopwatch for repeated timed trials.
//!
//! Measurements are taken with `std::time::Instant`, the monotonic wall
//! clock. Kernel trials run for fractions of a second up to several seconds,
//! so nanosecond-level counter tricks buy nothing here; what matters is that
//! the clock never goes backwards and that repeated start/stop cycles fold
//! into running aggregates without bookkeeping at the call site.

use std::hint::black_box as std_black_box;
use std::time::Instant;

use super::accumulator::{MinMeanAccumulator, TimingSample};

/// Wrapper around `std::hint::black_box` for preventing compiler optimizations.
///
/// Wrap kernel outputs in this so the compiler cannot elide the computation
/// being timed or reorder it relative to the clock reads.
#[inline]
pub fn black_box<T>(x: T) -> T {
    std_black_box(x)
}

/// Scoped stopwatch over repeated start/stop cycles.
///
/// Every `stop` closes the currently open interval and folds it into the
/// running minimum, mean and last-value aggregates. The timer itself holds
/// the statistics, so a measurement loop reads
///
/// ```
/// use flopmark::measurement::WallTimer;
///
/// let mut timer = WallTimer::new();
/// for _ in 0..3 {
///     timer.start();
///     // ... timed work ...
///     timer.stop();
/// }
/// assert_eq!(timer.trials(), 3);
/// assert!(timer.min() <= timer.mean());
/// ```
///
/// # Panics
///
/// Mispairing is a programming error, not a measurable condition: `start`
/// while an interval is open and `stop` without an open interval both panic.
#[derive(Debug, Clone)]
pub struct WallTimer {
    started: Option<Instant>,
    acc: MinMeanAccumulator,
}

impl WallTimer {
    /// Create a stopped timer with no recorded trials.
    pub fn new() -> Self {
        Self {
            started: None,
            acc: MinMeanAccumulator::new(),
        }
    }

    /// Open a new timed interval.
    pub fn start(&mut self) {
        assert!(
            self.started.is_none(),
            "WallTimer::start() while an interval is already open"
        );
        self.started = Some(Instant::now());
    }

    /// Close the open interval and fold it into the aggregates.
    pub fn stop(&mut self) -> TimingSample {
        let started = self
            .started
            .take()
            .expect("WallTimer::stop() without a matching start()");
        let sample = TimingSample {
            secs: started.elapsed().as_secs_f64(),
        };
        self.acc.record(sample);
        sample
    }

    /// Duration of the most recent trial in seconds, `0.0` before any trial.
    pub fn last(&self) -> f64 {
        self.acc.last()
    }

    /// Shortest trial in seconds, `f64::INFINITY` before any trial.
    pub fn min(&self) -> f64 {
        self.acc.min()
    }

    /// Mean trial duration in seconds, `0.0` before any trial.
    pub fn mean(&self) -> f64 {
        self.acc.mean()
    }

    /// Number of completed trials.
    pub fn trials(&self) -> usize {
        self.acc.count()
    }

    /// Discard all recorded trials. Panics if an interval is open.
    pub fn reset(&mut self) {
        assert!(
            self.started.is_none(),
            "WallTimer::reset() while an interval is open"
        );
        self.acc.reset();
    }
}

impl Default for WallTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimate the smallest interval the wall clock can resolve, in seconds.
///
/// Spins until `Instant` reports a non-zero elapsed time and keeps the
/// minimum over many probes. On mainstream platforms this lands in the
/// tens-of-nanoseconds range; a coarse result is worth a diagnostic because
/// trials near the resolution carry quantization error.
pub fn estimate_resolution() -> f64 {
    const PROBES: usize = 1_000;

    let mut min_secs = f64::INFINITY;
    for _ in 0..PROBES {
        let start = Instant::now();
        let mut elapsed = start.elapsed();
        while elapsed.is_zero() {
            elapsed = start.elapsed();
        }
        let secs = elapsed.as_secs_f64();
        if secs < min_secs {
            min_secs = secs;
        }
    }
    min_secs
}
