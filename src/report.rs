//! The sweep report: everything one sweep produced.

use serde::{Deserialize, Serialize};

use crate::backends::{Backend, Selection};
use crate::config::Config;
use crate::diag::Diagnostics;
use crate::kernels::Kernel;
use crate::run::RunConfig;

/// Complete result of one sweep.
///
/// Runs appear in report order (fill degree, then size) with their
/// calibrated step counts, flop counts and per-backend raw minimum times.
/// Throughput is derived, not stored; [`RunConfig::mflops`] computes it
/// from the stored fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// The kernel that was benchmarked.
    pub kernel: Kernel,
    /// Which backends were selected.
    pub selection: Selection,
    /// Backend labels in declared measurement order, the order of the
    /// per-run result slots.
    pub backend_order: Vec<String>,
    /// All runs, in report order, with results filled in.
    pub runs: Vec<RunConfig>,
    /// Diagnostics recorded during the sweep, in order of occurrence.
    pub diagnostics: Diagnostics,
    /// Policy and environment bookkeeping.
    pub metadata: Metadata,
}

impl SweepReport {
    /// Backends that were measured, in declared order.
    pub fn measured_backends(&self) -> impl Iterator<Item = Backend> + '_ {
        Backend::ALL
            .into_iter()
            .filter(|b| self.selection.contains(*b))
    }
}

/// Policy and environment facts recorded alongside the results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// The policy the sweep ran under.
    pub config: Config,
    /// Estimated wall-clock resolution in seconds.
    pub timer_resolution_secs: f64,
    /// Total sweep duration in seconds, setup included.
    pub runtime_secs: f64,
    /// Runs whose step count came from the doubling search.
    pub calibrated_runs: usize,
    /// Runs assigned a single step via the slow-size shortcut.
    pub shortcut_runs: usize,
    /// Runs whose step count was fixed in the parameter input.
    pub explicit_runs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trips() {
        let mut run = RunConfig::sparse(1_000, 50).with_steps(18);
        run.set_flops(50);
        run.set_result(Backend::Native, 1.5e-3);

        let report = SweepReport {
            kernel: Kernel::SVecScalarMult,
            selection: Selection::only(Backend::Native),
            backend_order: Backend::ALL.iter().map(|b| b.label().to_string()).collect(),
            runs: vec![run],
            diagnostics: Diagnostics::new(false),
            metadata: Metadata {
                config: Config::quick(),
                timer_resolution_secs: 2.0e-8,
                runtime_secs: 12.5,
                calibrated_runs: 0,
                shortcut_runs: 0,
                explicit_runs: 1,
            },
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: SweepReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kernel, Kernel::SVecScalarMult);
        assert_eq!(back.runs.len(), 1);
        assert_eq!(back.runs[0].steps(), 18);
        assert_eq!(back.runs[0].result(Backend::Native), Some(1.5e-3));
        assert_eq!(back.metadata.explicit_runs, 1);
    }

    #[test]
    fn measured_backends_follow_declared_order() {
        let report = SweepReport {
            kernel: Kernel::Daxpy,
            selection: Selection::none()
                .with(Backend::Ndarray)
                .with(Backend::Native),
            backend_order: Vec::new(),
            runs: Vec::new(),
            diagnostics: Diagnostics::new(false),
            metadata: Metadata {
                config: Config::quick(),
                timer_resolution_secs: 0.0,
                runtime_secs: 0.0,
                calibrated_runs: 0,
                shortcut_runs: 0,
                explicit_runs: 0,
            },
        };
        let order: Vec<Backend> = report.measured_backends().collect();
        assert_eq!(order, vec![Backend::Native, Backend::Ndarray]);
    }
}
