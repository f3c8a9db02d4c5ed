//! Running aggregation over timing samples.

/// One elapsed-time observation from a single timed trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSample {
    /// Elapsed wall-clock time in seconds.
    pub secs: f64,
}

/// Running minimum, mean and last value over a sequence of samples.
///
/// The mean is maintained incrementally, so long sweeps do not lose
/// precision to a growing sum. An empty accumulator reports a minimum of
/// `f64::INFINITY` and a mean and last value of `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct MinMeanAccumulator {
    count: usize,
    min: f64,
    mean: f64,
    last: f64,
}

impl MinMeanAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            min: f64::INFINITY,
            mean: 0.0,
            last: 0.0,
        }
    }

    /// Fold one sample into the running aggregates.
    pub fn record(&mut self, sample: TimingSample) {
        self.count += 1;
        self.last = sample.secs;
        if sample.secs < self.min {
            self.min = sample.secs;
        }
        self.mean += (sample.secs - self.mean) / self.count as f64;
    }

    /// Number of samples recorded so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Smallest sample seen, or `f64::INFINITY` when empty.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Arithmetic mean of all samples, or `0.0` when empty.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// The most recent sample, or `0.0` when empty.
    pub fn last(&self) -> f64 {
        self.last
    }

    /// Discard all samples, returning to the empty state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for MinMeanAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
