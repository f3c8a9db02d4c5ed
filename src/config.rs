//! Configuration types for calibration and measurement policy.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DEVIATION_PCT, DEFAULT_MAX_TRIALS, DEFAULT_MAX_TRIAL_SECS, DEFAULT_MIN_TRIAL_SECS,
    DEFAULT_SEED, DEFAULT_TARGET_SECS,
};

/// Policy constants governing one benchmark sweep.
///
/// A `Config` is fixed for the duration of a sweep: every run configuration
/// and every backend is calibrated and measured under the same policy, so
/// throughput numbers within a sweep are comparable.
///
/// # Example
///
/// ```
/// use flopmark::Config;
///
/// let config = Config {
///     target_secs: 1.0,
///     ..Config::default()
/// };
/// assert_eq!(config.max_trials, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Shortest trial duration accepted as reliable, in seconds.
    ///
    /// The calibrator keeps doubling the step count until a single trial
    /// takes at least this long; anything shorter is dominated by clock
    /// granularity (default: 0.2).
    pub min_trial_secs: f64,

    /// Trial duration the calibrator scales the step count toward, in
    /// seconds (default: 2.0).
    pub target_secs: f64,

    /// Upper bound on stabilization trials per measurement (default: 20).
    pub max_trials: usize,

    /// Per-trial budget in seconds. A trial that runs longer than this ends
    /// the stabilization loop early; more trials at that cost would not
    /// sharpen the minimum (default: 5.0).
    pub max_trial_secs: f64,

    /// Allowed spread between the minimum and the mean trial time before a
    /// variance warning is recorded, in percent (default: 5.0).
    pub deviation_pct: f64,

    /// Base seed for deterministic input generation. Each run derives its
    /// own stream from this seed together with the kernel and problem
    /// dimensions, so repeated sweeps see identical inputs (default: fixed).
    pub seed: u64,

    /// Echo recorded diagnostics to stderr as they occur, interleaved with
    /// progress output (default: true).
    pub echo_diagnostics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_trial_secs: DEFAULT_MIN_TRIAL_SECS,
            target_secs: DEFAULT_TARGET_SECS,
            max_trials: DEFAULT_MAX_TRIALS,
            max_trial_secs: DEFAULT_MAX_TRIAL_SECS,
            deviation_pct: DEFAULT_DEVIATION_PCT,
            seed: DEFAULT_SEED,
            echo_diagnostics: true,
        }
    }
}

impl Config {
    /// Fast preset for tests and smoke runs.
    ///
    /// Trial budgets are cut to the millisecond range and diagnostics are
    /// kept quiet. Results are noisy; use [`Config::default`] for real
    /// measurements.
    pub fn quick() -> Self {
        Self {
            min_trial_secs: 1e-4,
            target_secs: 1e-3,
            max_trials: 5,
            max_trial_secs: 0.05,
            deviation_pct: 50.0,
            echo_diagnostics: false,
            ..Self::default()
        }
    }
}
