//! Default policy constants for the measurement engine.
//!
//! These are the process-wide knobs of one sweep: how short a trial may be
//! before it is considered unreliable, how long the calibrator should aim
//! for, and when to stop collecting trials. They are fixed for the duration
//! of a sweep (see [`crate::Config`]).

/// Shortest trial duration accepted as a reliable measurement, in seconds.
///
/// The calibrator doubles the step count until a single trial reaches this
/// threshold; anything shorter is dominated by timer noise.
pub const DEFAULT_MIN_TRIAL_SECS: f64 = 0.2;

/// Trial duration the calibrator scales toward, in seconds.
pub const DEFAULT_TARGET_SECS: f64 = 2.0;

/// Maximum number of stabilization trials per measurement.
pub const DEFAULT_MAX_TRIALS: usize = 20;

/// Per-trial budget in seconds; a trial longer than this ends the
/// stabilization loop early.
pub const DEFAULT_MAX_TRIAL_SECS: f64 = 5.0;

/// Tolerated spread between minimum and mean trial time before a variance
/// warning is recorded, in percent.
pub const DEFAULT_DEVIATION_PCT: f64 = 5.0;

/// Base seed for deterministic input generation.
pub const DEFAULT_SEED: u64 = 736_180_423;

/// Wall-clock resolution above which a coarse-timer diagnostic is recorded,
/// in seconds. Kernel steps shorter than the clock tick cannot be resolved.
pub const TIMER_RESOLUTION_BUDGET_SECS: f64 = 1e-6;
