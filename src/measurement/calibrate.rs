//! Step-count calibration.
//!
//! Before a kernel is measured, the engine has to decide how many
//! repetitions (steps) make up one timed trial. Too few and the trial
//! drowns in clock granularity; too many and the sweep wastes time. The
//! calibrator finds the count with a doubling search followed by one linear
//! scaling step, costing O(log(target/unit)) kernel trials instead of a
//! linear ramp.

use crate::config::Config;
use crate::diag::{Diagnostic, Diagnostics};
use crate::kernels::KernelCheck;

use super::timer::WallTimer;

/// Outcome of calibrating one run configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Repetitions per timed trial after scaling toward the target duration.
    /// Always at least 1.
    pub steps: usize,
    /// Elapsed seconds of the final doubling trial, the scaling baseline.
    pub trial_secs: f64,
}

/// Scale a reliable trial to the target duration.
///
/// `measured` is the duration of one trial at `steps` repetitions; the
/// result is the repetition count whose trial is expected to take
/// `target_secs`. The quotient truncates and is clamped to at least 1, so a
/// kernel whose single repetition already exceeds the target still runs
/// once per trial.
fn scale_steps(target_secs: f64, steps: usize, measured: f64) -> usize {
    let scaled = (target_secs * steps as f64 / measured) as usize;
    scaled.max(1)
}

/// Find the step count whose single trial approaches the target duration.
///
/// Runs the kernel at 1, 2, 4, ... repetitions until one trial takes at
/// least `config.min_trial_secs`, then linearly scales that count toward
/// `config.target_secs`. The search never undershoots: the loop exits on
/// the first trial at or above the reliability threshold, so the scaling
/// baseline is itself a reliable measurement.
///
/// Sanity-check failures reported by the kernel are recorded against
/// `context` and do not interrupt the search.
pub fn calibrate<F>(
    context: &str,
    mut kernel: F,
    config: &Config,
    diag: &mut Diagnostics,
) -> Calibration
where
    F: FnMut(usize) -> KernelCheck,
{
    let mut timer = WallTimer::new();
    let mut steps = 1usize;

    loop {
        timer.start();
        let check = kernel(steps);
        timer.stop();

        if let Some(reason) = check.failure() {
            diag.record(Diagnostic::CheckFailed {
                context: context.to_string(),
                reason: reason.to_string(),
            });
        }
        if timer.last() >= config.min_trial_secs {
            break;
        }
        steps *= 2;
    }

    Calibration {
        steps: scale_steps(config.target_secs, steps, timer.last()),
        trial_secs: timer.last(),
    }
}
