//! # flopmark
//!
//! Calibrated benchmark measurement for linear-algebra kernels.
//!
//! This crate measures how fast competing backend libraries execute a set
//! of dense and sparse kernels, producing:
//! - Throughput in MFlop/s per backend and problem size
//! - Raw minimum trial times for every run
//! - Diagnostics for unstable or implausible measurements
//!
//! ## How a measurement works
//!
//! Timing one kernel evaluation directly is hopeless for small problems:
//! the clock tick dwarfs the work. The engine instead calibrates a *step
//! count* per run configuration (a doubling search until one trial is
//! reliably long, then a linear scale toward a target duration), repeats
//! trials at that fixed count, and reports the fastest trial. Every backend
//! measures at the same step count over numerically identical inputs, so
//! the resulting numbers are directly comparable.
//!
//! ## Quick Start
//!
//! ```no_run
//! use flopmark::{Kernel, RunConfig, Selection, Sweep};
//!
//! let report = Sweep::new(Kernel::DMatDVecMult)
//!     .runs([RunConfig::new(100), RunConfig::new(1_000)])
//!     .selection(Selection::all())
//!     .execute(&mut std::io::stdout())?;
//!
//! for run in &report.runs {
//!     println!("{run}");
//! }
//! # Ok::<(), flopmark::SweepError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod constants;
mod diag;
mod error;
mod kernels;
mod params;
mod report;
mod run;
mod sweep;

// Functional modules
pub mod backends;
pub mod inputs;
pub mod measurement;
pub mod output;

// Re-exports for public API
pub use backends::{Backend, Selection};
pub use config::Config;
pub use constants::{
    DEFAULT_DEVIATION_PCT, DEFAULT_MAX_TRIALS, DEFAULT_MAX_TRIAL_SECS, DEFAULT_MIN_TRIAL_SECS,
    DEFAULT_SEED, DEFAULT_TARGET_SECS,
};
pub use diag::{Diagnostic, Diagnostics};
pub use error::SweepError;
pub use kernels::{Kernel, KernelCheck};
pub use measurement::{Calibration, Measurement, WallTimer};
pub use params::{load_runs, parse_runs};
pub use report::{Metadata, SweepReport};
pub use run::RunConfig;
pub use sweep::Sweep;

/// Convenience function: sweep a kernel with the default policy, writing
/// progress to stdout.
///
/// Equivalent to building a [`Sweep`] by hand; use the builder when you
/// need a custom [`Config`], a different progress writer, or parameter
/// parsing.
///
/// # Arguments
///
/// * `kernel` - The kernel to benchmark
/// * `runs` - The run configurations to measure
/// * `selection` - Which backends to compare
///
/// # Errors
///
/// Fails on invalid setup (empty selection, no runs, a backend that cannot
/// run the kernel, malformed dimensions) or when writing progress fails.
pub fn sweep(
    kernel: Kernel,
    runs: impl IntoIterator<Item = RunConfig>,
    selection: Selection,
) -> Result<SweepReport, SweepError> {
    Sweep::new(kernel)
        .runs(runs)
        .selection(selection)
        .execute(&mut std::io::stdout())
}
