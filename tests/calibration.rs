//! Step-count calibration behavior through the public API.
//!
//! These tests shrink the timing budgets so calibration converges in
//! microseconds of measured work rather than seconds.

use std::time::Duration;

use flopmark::measurement::{calibrate, WallTimer};
use flopmark::{Backend, Config, Diagnostics, Kernel, KernelCheck, RunConfig, Selection, Sweep};

/// Explicit step counts are taken as-is; the search never runs.
#[test]
fn explicit_steps_skip_the_search() {
    let report = Sweep::new(Kernel::Daxpy)
        .runs([RunConfig::new(32).with_steps(3), RunConfig::new(64).with_steps(9)])
        .selection(Selection::all().without(Backend::Ndarray))
        .config(tiny_config())
        .execute(&mut Vec::new())
        .expect("sweep should succeed");

    let steps: Vec<usize> = report.runs.iter().map(RunConfig::steps).collect();
    assert_eq!(steps, vec![3, 9]);
    assert_eq!(report.metadata.explicit_runs, 2);
    assert_eq!(report.metadata.calibrated_runs, 0);
}

/// Calibrated step counts shrink as the per-evaluation cost grows: a small
/// vector needs far more repetitions to fill the trial budget than one two
/// orders of magnitude larger.
#[test]
fn calibrated_steps_scale_with_workload() {
    let report = Sweep::new(Kernel::DVecDVecAdd)
        .runs([RunConfig::new(64), RunConfig::new(8_192)])
        .selection(Selection::only(Backend::Native))
        .config(tiny_config())
        .execute(&mut Vec::new())
        .expect("sweep should succeed");

    let small = &report.runs[0];
    let large = &report.runs[1];
    assert!(small.steps() >= 1);
    assert!(large.steps() >= 1);
    assert!(
        small.steps() > large.steps(),
        "steps {} for N=64 should exceed steps {} for N=8192",
        small.steps(),
        large.steps()
    );

    assert!(report.metadata.timer_resolution_secs > 0.0);
    assert_eq!(report.metadata.calibrated_runs, 2);
}

/// Step counts are resolved before any backend measures, so calibration
/// happens even when the reference backend is deselected. Every backend
/// then sees the same per-run workload.
#[test]
fn deselecting_native_still_calibrates() {
    let report = Sweep::new(Kernel::DVecDVecAdd)
        .run(RunConfig::new(256))
        .selection(Selection::only(Backend::Nalgebra))
        .config(tiny_config())
        .execute(&mut Vec::new())
        .expect("sweep should succeed");

    let run = &report.runs[0];
    assert!(run.steps() >= 1);
    assert_eq!(report.metadata.calibrated_runs, 1);
    assert!(run.result(Backend::Native).is_none());
    assert!(run.result(Backend::Nalgebra).is_some());
}

/// A negative deviation allowance puts the tolerance below the minimum
/// itself, so every stabilized measurement is flagged. One warning per
/// backend and run.
#[test]
fn deviation_warnings_reach_the_report() {
    let config = Config {
        deviation_pct: -100.0,
        ..tiny_config()
    };
    let report = Sweep::new(Kernel::Daxpy)
        .run(RunConfig::new(512))
        .selection(Selection::all().without(Backend::Ndarray))
        .config(config)
        .execute(&mut Vec::new())
        .expect("sweep should succeed");

    assert_eq!(report.diagnostics.variance_warnings(), 2);
}

/// More repetitions can only take longer: for step counts S1 < S2 over the
/// same kernel, the trial at S2 runs at least as long as the trial at S1,
/// within scheduler noise.
#[test]
fn trial_time_is_monotone_in_the_step_count() {
    let mut timer = WallTimer::new();
    let mut trial = |steps: usize| {
        timer.reset();
        timer.start();
        std::thread::sleep(Duration::from_micros(200) * steps as u32);
        timer.stop();
        timer.last()
    };

    let short = trial(1);
    let long = trial(50);
    assert!(short > 0.0);
    // 50x the work dwarfs any plausible jitter on the 200 us trial.
    assert!(
        long >= short,
        "50 steps took {long} s, less than {short} s for 1 step"
    );
}

/// Calibration is reproducible, not identical: two searches over the same
/// kernel and policy land on step counts within a small bounded ratio.
#[test]
fn repeated_calibration_agrees_within_a_bounded_ratio() {
    let config = Config {
        min_trial_secs: 2e-3,
        target_secs: 1e-2,
        ..Config::quick()
    };
    let mut diag = Diagnostics::new(false);
    let mut search = || {
        calibrate(
            "steady kernel",
            |steps| {
                std::thread::sleep(Duration::from_micros(300) * steps as u32);
                KernelCheck::Ok
            },
            &config,
            &mut diag,
        )
    };

    let first = search();
    let second = search();
    assert!(first.steps >= 1);
    assert!(second.steps >= 1);

    let ratio = first.steps.max(second.steps) as f64 / first.steps.min(second.steps) as f64;
    assert!(
        ratio <= 4.0,
        "calibrations disagree: {} vs {} steps",
        first.steps,
        second.steps
    );
}

fn tiny_config() -> Config {
    Config {
        min_trial_secs: 5e-5,
        target_secs: 2e-4,
        max_trials: 3,
        max_trial_secs: 0.02,
        deviation_pct: 1000.0,
        ..Config::quick()
    }
}
