//! Stabilized minimum-time measurement.
//!
//! One trial is not a measurement. The engine repeats each trial and keeps
//! the minimum: on an otherwise idle machine the fastest observation is the
//! one least disturbed by scheduling, migrations and cache pollution, so
//! the minimum converges on the kernel's steady-state cost while the mean
//! keeps drifting with the noise floor.

use crate::config::Config;
use crate::diag::{Diagnostic, Diagnostics};
use crate::kernels::KernelCheck;

use super::timer::WallTimer;

/// Result of a stabilized measurement: aggregates over all trials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Fastest trial in seconds. This is the reported result.
    pub min_secs: f64,
    /// Mean trial duration in seconds.
    pub mean_secs: f64,
    /// Number of trials actually executed.
    pub trials: usize,
}

/// Whether the min-to-mean spread exceeds the tolerance.
///
/// Flags when `min * (1 + pct/100) < mean`, i.e. the mean lies more than
/// `pct` percent above the fastest trial.
fn deviation_exceeded(min_secs: f64, mean_secs: f64, tolerance_pct: f64) -> bool {
    min_secs * (1.0 + tolerance_pct / 100.0) < mean_secs
}

/// Measure a kernel at a fixed step count and keep the fastest trial.
///
/// Runs up to `config.max_trials` trials of `steps` repetitions each. A
/// trial that exceeds `config.max_trial_secs` ends the loop early: at that
/// cost, further trials would stretch the sweep without sharpening the
/// minimum. After the loop the min-to-mean spread is checked against
/// `config.deviation_pct` and a [`Diagnostic::HighVariance`] is recorded
/// when it is exceeded.
///
/// The caller is expected to have run one warm-up evaluation beforehand so
/// the first trial does not pay for cold caches and page faults.
pub fn stabilized_min<F>(
    context: &str,
    steps: usize,
    mut kernel: F,
    config: &Config,
    diag: &mut Diagnostics,
) -> Measurement
where
    F: FnMut(usize) -> KernelCheck,
{
    let mut timer = WallTimer::new();

    for _ in 0..config.max_trials {
        timer.start();
        let check = kernel(steps);
        timer.stop();

        if let Some(reason) = check.failure() {
            diag.record(Diagnostic::CheckFailed {
                context: context.to_string(),
                reason: reason.to_string(),
            });
        }
        if timer.last() > config.max_trial_secs {
            break;
        }
    }

    let measurement = Measurement {
        min_secs: timer.min(),
        mean_secs: timer.mean(),
        trials: timer.trials(),
    };
    if deviation_exceeded(measurement.min_secs, measurement.mean_secs, config.deviation_pct) {
        diag.record(Diagnostic::HighVariance {
            context: context.to_string(),
            min_secs: measurement.min_secs,
            mean_secs: measurement.mean_secs,
            tolerance_pct: config.deviation_pct,
        });
    }
    measurement
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn deviation_predicate_uses_relative_tolerance() {
        // mean 30% above min, tolerance 10%.
        assert!(deviation_exceeded(0.10, 0.13, 10.0));
        // mean within 5% of min.
        assert!(!deviation_exceeded(0.10, 0.104, 5.0));
        // boundary: min * 1.1 == mean is not an excess.
        assert!(!deviation_exceeded(0.10, 0.11, 10.0));
    }

    #[test]
    fn runs_the_configured_number_of_trials() {
        let config = Config {
            max_trials: 4,
            max_trial_secs: 1.0,
            deviation_pct: 1000.0,
            ..Config::quick()
        };
        let mut diag = Diagnostics::new(false);
        let mut calls = 0usize;
        let m = stabilized_min(
            "test kernel",
            3,
            |steps| {
                assert_eq!(steps, 3);
                calls += 1;
                std::thread::sleep(Duration::from_micros(300));
                KernelCheck::Ok
            },
            &config,
            &mut diag,
        );

        assert_eq!(calls, 4);
        assert_eq!(m.trials, 4);
        assert!(m.min_secs >= 300e-6);
        assert!(m.min_secs <= m.mean_secs);
    }

    #[test]
    fn overlong_trial_ends_the_loop_early() {
        let config = Config {
            max_trials: 20,
            max_trial_secs: 1e-3,
            deviation_pct: 1000.0,
            ..Config::quick()
        };
        let mut diag = Diagnostics::new(false);
        let m = stabilized_min(
            "test kernel",
            1,
            |_| {
                std::thread::sleep(Duration::from_millis(3));
                KernelCheck::Ok
            },
            &config,
            &mut diag,
        );

        // First trial already exceeds the budget; its time still counts.
        assert_eq!(m.trials, 1);
        assert!(m.min_secs >= 3e-3);
    }

    #[test]
    fn unstable_trials_raise_a_variance_warning() {
        let config = Config {
            max_trials: 4,
            max_trial_secs: 1.0,
            deviation_pct: 5.0,
            ..Config::quick()
        };
        let mut diag = Diagnostics::new(false);
        let mut first = true;
        stabilized_min(
            "test kernel",
            1,
            |_| {
                let micros = if first { 4_000 } else { 500 };
                first = false;
                std::thread::sleep(Duration::from_micros(micros));
                KernelCheck::Ok
            },
            &config,
            &mut diag,
        );

        assert_eq!(diag.variance_warnings(), 1);
    }
}
