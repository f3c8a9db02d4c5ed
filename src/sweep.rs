//! Sweep orchestration.
//!
//! A sweep measures one kernel over a list of run configurations and a set
//! of backends. The order of work is fixed:
//!
//! 1. validate the setup, estimate the clock resolution
//! 2. sort runs by fill degree, then size
//! 3. resolve every step count (calibration, shortcut, or explicit)
//! 4. measure backend after backend, runs grouped by fill degree
//! 5. emit the raw-times summary and assemble the report
//!
//! Calibration happens once per run against the native backend; all
//! backends then measure the identical trial workload, which is what makes
//! their numbers comparable. Sizes are swept in ascending order so the
//! monotonicity shortcut can kick in: once a size calibrates to a single
//! step, every larger size is assigned one step without further search.

use std::io::Write;
use std::time::Instant;

use crate::backends::{self, Backend, Selection};
use crate::config::Config;
use crate::constants::TIMER_RESOLUTION_BUDGET_SECS;
use crate::diag::{Diagnostic, Diagnostics};
use crate::error::SweepError;
use crate::kernels::Kernel;
use crate::measurement::estimate_resolution;
use crate::output::terminal;
use crate::params;
use crate::report::{Metadata, SweepReport};
use crate::run::RunConfig;

/// Builder and executor for one benchmark sweep.
///
/// # Example
///
/// ```no_run
/// use flopmark::{Config, Kernel, RunConfig, Selection, Sweep};
///
/// let report = Sweep::new(Kernel::Daxpy)
///     .runs([RunConfig::new(1_000), RunConfig::new(10_000)])
///     .selection(Selection::all())
///     .config(Config::default())
///     .execute(&mut std::io::stdout())?;
///
/// for run in &report.runs {
///     println!("{run}");
/// }
/// # Ok::<(), flopmark::SweepError>(())
/// ```
#[derive(Debug)]
pub struct Sweep {
    kernel: Kernel,
    runs: Vec<RunConfig>,
    selection: Selection,
    config: Config,
}

impl Sweep {
    /// Start a sweep for `kernel` with default selection and policy.
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            runs: Vec::new(),
            selection: Selection::default(),
            config: Config::default(),
        }
    }

    /// Append one run configuration.
    pub fn run(mut self, run: RunConfig) -> Self {
        self.runs.push(run);
        self
    }

    /// Append run configurations.
    pub fn runs(mut self, runs: impl IntoIterator<Item = RunConfig>) -> Self {
        self.runs.extend(runs);
        self
    }

    /// Append runs parsed from parameter text (see [`crate::parse_runs`]).
    pub fn params(mut self, input: &str) -> Result<Self, SweepError> {
        let parsed = params::parse_runs(self.kernel, input)?;
        self.runs.extend(parsed);
        Ok(self)
    }

    /// Choose which backends to measure.
    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Override the measurement policy.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The kernel this sweep is set up for.
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    fn validate(&self) -> Result<(), SweepError> {
        if self.selection.is_empty() {
            return Err(SweepError::EmptySelection);
        }
        if self.runs.is_empty() {
            return Err(SweepError::NoRuns);
        }
        for backend in self.selection.enabled() {
            if !backend.supports(self.kernel) {
                return Err(SweepError::UnsupportedBackend {
                    backend,
                    kernel: self.kernel,
                });
            }
        }
        for run in &self.runs {
            if run.size() == 0 {
                return Err(SweepError::InvalidRun {
                    size: 0,
                    reason: "size must be at least 1".into(),
                });
            }
            if self.kernel.is_sparse() {
                match run.nonzeros() {
                    None => {
                        return Err(SweepError::MissingFill {
                            kernel: self.kernel,
                            size: run.size(),
                        })
                    }
                    Some(0) => {
                        return Err(SweepError::InvalidRun {
                            size: run.size(),
                            reason: "non-zero count must be at least 1".into(),
                        })
                    }
                    Some(f) if f > run.size() => {
                        return Err(SweepError::InvalidRun {
                            size: run.size(),
                            reason: format!("non-zero count {f} exceeds the size"),
                        })
                    }
                    Some(_) => {}
                }
            } else if run.nonzeros().is_some() {
                return Err(SweepError::InvalidRun {
                    size: run.size(),
                    reason: format!("dense kernel '{}' takes no non-zero count", self.kernel),
                });
            }
        }
        Ok(())
    }

    /// Execute the sweep, writing progress to `out`.
    ///
    /// Progress is written as measurements complete, one group of runs per
    /// backend and fill degree, so long sweeps stay observable. The
    /// assembled [`SweepReport`] carries the same data plus diagnostics and
    /// metadata.
    ///
    /// # Errors
    ///
    /// Setup problems and progress-write failures abort the sweep. A
    /// backend failing mid-sweep does not: its remaining runs are skipped
    /// and a [`Diagnostic::BackendAborted`] is recorded.
    pub fn execute<W: Write>(self, out: &mut W) -> Result<SweepReport, SweepError> {
        self.validate()?;
        let Sweep {
            kernel,
            mut runs,
            selection,
            config,
        } = self;
        let started = Instant::now();
        let mut diag = Diagnostics::new(config.echo_diagnostics);

        writeln!(out, "{}", terminal::banner(kernel))?;

        let timer_resolution_secs = estimate_resolution();
        if timer_resolution_secs > TIMER_RESOLUTION_BUDGET_SECS {
            diag.record(Diagnostic::CoarseTimer {
                resolution_secs: timer_resolution_secs,
            });
        }

        runs.sort();

        let mut calibrated_runs = 0;
        let mut shortcut_runs = 0;
        let mut explicit_runs = 0;
        // Smallest size known to calibrate to a single step. Trial time
        // grows monotonically with size within a kernel, so everything at
        // or above this size gets one step without searching.
        let mut slow_size: Option<usize> = None;
        for run in &mut runs {
            run.set_flops(kernel.flops(run.size(), run.nonzeros()));
            if run.steps() != 0 {
                explicit_runs += 1;
                continue;
            }
            if slow_size.map_or(true, |limit| run.size() < limit) {
                let calibration = backends::calibrate_run(kernel, run, &config, &mut diag);
                run.set_steps(calibration.steps);
                calibrated_runs += 1;
                if calibration.steps == 1 {
                    slow_size = Some(run.size());
                }
            } else {
                run.set_steps(1);
                shortcut_runs += 1;
            }
        }

        for backend in selection.enabled() {
            measure_backend(backend, kernel, &mut runs, &config, &mut diag, out)?;
        }

        writeln!(out)?;
        writeln!(out, "{}", terminal::summary_header())?;
        for run in &runs {
            writeln!(out, "{run}")?;
        }

        Ok(SweepReport {
            kernel,
            selection,
            backend_order: Backend::ALL.iter().map(|b| b.label().to_string()).collect(),
            runs,
            diagnostics: diag,
            metadata: Metadata {
                config,
                timer_resolution_secs,
                runtime_secs: started.elapsed().as_secs_f64(),
                calibrated_runs,
                shortcut_runs,
                explicit_runs,
            },
        })
    }
}

/// Measure every run on one backend, writing progress grouped by fill
/// degree. A measurement failure skips the backend's remaining runs and
/// records a diagnostic; other backends are unaffected.
fn measure_backend<W: Write>(
    backend: Backend,
    kernel: Kernel,
    runs: &mut [RunConfig],
    config: &Config,
    diag: &mut Diagnostics,
    out: &mut W,
) -> Result<(), SweepError> {
    let mut index = 0;
    while index < runs.len() {
        let group_start = index;
        // Written on the first completed measurement, so a backend that
        // fails immediately leaves no dangling header behind.
        let mut header_written = false;
        while index < runs.len() && runs[index].same_fill(&runs[group_start]) {
            match backend.measure(kernel, &runs[index], config, diag) {
                Ok(min_secs) => {
                    runs[index].set_result(backend, min_secs);
                    if !header_written {
                        writeln!(out)?;
                        writeln!(
                            out,
                            "{}",
                            terminal::group_header(backend, runs[group_start].fill_degree())
                        )?;
                        header_written = true;
                    }
                    writeln!(out, "{}", terminal::progress_line(&runs[index], backend))?;
                }
                Err(failure) => {
                    diag.record(Diagnostic::BackendAborted {
                        backend: backend.label().to_string(),
                        remaining: runs.len() - index,
                        reason: failure.to_string(),
                    });
                    return Ok(());
                }
            }
            index += 1;
        }
    }
    Ok(())
}
