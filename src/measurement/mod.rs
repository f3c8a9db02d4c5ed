//! Measurement infrastructure for the benchmark engine.
//!
//! This module provides:
//! - A wall-clock stopwatch that folds repeated trials into running
//!   minimum/mean aggregates
//! - Step-count calibration via doubling search plus linear scaling
//! - Stabilized minimum-time measurement with variance checking
//!
//! # Protocol
//!
//! A *step* is one kernel evaluation; a *trial* is a timed block of
//! consecutive steps. Calibration picks the step count once per run
//! configuration so that one trial lands near the configured target
//! duration; stabilization then repeats trials at that fixed step count and
//! reports the fastest one. All durations are wall-clock seconds from
//! `std::time::Instant`.

mod accumulator;
mod calibrate;
mod stabilize;
mod timer;

pub use accumulator::{MinMeanAccumulator, TimingSample};
pub use calibrate::{calibrate, Calibration};
pub use stabilize::{stabilized_min, Measurement};
pub use timer::{black_box, estimate_resolution, WallTimer};
