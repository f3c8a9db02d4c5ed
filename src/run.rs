//! Benchmark run configurations.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backends::Backend;

/// One benchmark point: a problem size, an optional non-zero count, the
/// calibrated step count, and per-backend results.
///
/// A run starts with `steps == 0`, the uncalibrated sentinel. The
/// orchestrator resolves it exactly once, either by calibration, by the
/// slow-size shortcut, or from an explicit step count in the parameter
/// input. Once resolved the count applies to every backend, which is what
/// makes the per-backend times comparable.
///
/// Runs order by fill degree, then by size. Equality follows the same key:
/// two runs are equal when they describe the same benchmark point, whatever
/// their measured results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    size: usize,
    nonzeros: Option<usize>,
    steps: usize,
    flops: u64,
    results: [Option<f64>; Backend::COUNT],
}

impl RunConfig {
    /// A dense run of the given problem size, awaiting calibration.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            nonzeros: None,
            steps: 0,
            flops: 0,
            results: [None; Backend::COUNT],
        }
    }

    /// A sparse run: problem size plus non-zero count per structure.
    pub fn sparse(size: usize, nonzeros: usize) -> Self {
        Self {
            nonzeros: Some(nonzeros),
            ..Self::new(size)
        }
    }

    /// Fix the step count up front, pre-empting calibration.
    ///
    /// # Panics
    ///
    /// Panics if `steps` is zero or the count was already fixed.
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.set_steps(steps);
        self
    }

    /// Problem size N.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Non-zeros per compressed structure, if this is a sparse run.
    pub fn nonzeros(&self) -> Option<usize> {
        self.nonzeros
    }

    /// Repetitions per timed trial; 0 while uncalibrated.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Flops for a single kernel evaluation at this size.
    pub fn flops(&self) -> u64 {
        self.flops
    }

    /// Non-zero share of the structure in percent, `None` for dense runs.
    pub fn fill_degree(&self) -> Option<f64> {
        self.nonzeros
            .map(|f| 100.0 * f as f64 / self.size as f64)
    }

    /// Whether two runs share a fill degree and belong to the same report
    /// group. Exact: compares F1/N1 against F2/N2 without rounding.
    pub fn same_fill(&self, other: &Self) -> bool {
        self.cmp_fill(other) == Ordering::Equal
    }

    /// Resolve the step count.
    ///
    /// # Panics
    ///
    /// Panics if `steps` is zero or the count was already fixed; the step
    /// count is written exactly once per run.
    pub fn set_steps(&mut self, steps: usize) {
        assert!(steps >= 1, "step count must be at least 1");
        assert!(self.steps == 0, "step count already fixed");
        self.steps = steps;
    }

    /// Record the flop count for one kernel evaluation.
    pub fn set_flops(&mut self, flops: u64) {
        self.flops = flops;
    }

    /// Record a backend's minimum trial time in seconds.
    pub fn set_result(&mut self, backend: Backend, min_secs: f64) {
        self.results[backend.index()] = Some(min_secs);
    }

    /// A backend's minimum trial time in seconds, if it was measured.
    pub fn result(&self, backend: Backend) -> Option<f64> {
        self.results[backend.index()]
    }

    /// A backend's throughput in MFlop/s, if it was measured.
    ///
    /// One trial performs `steps` evaluations of `flops` operations each,
    /// so the rate is `flops * steps / min_secs / 1e6`.
    pub fn mflops(&self, backend: Backend) -> Option<f64> {
        self.result(backend)
            .map(|secs| self.flops as f64 * self.steps as f64 / secs / 1e6)
    }

    fn fill_key(&self) -> Option<(u128, u128)> {
        self.nonzeros.map(|f| (f as u128, self.size as u128))
    }

    fn cmp_fill(&self, other: &Self) -> Ordering {
        match (self.fill_key(), other.fill_key()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            // F1/N1 <=> F2/N2, cross-multiplied to stay exact.
            (Some((f1, n1)), Some((f2, n2))) => (f1 * n2).cmp(&(f2 * n1)),
        }
    }
}

impl PartialEq for RunConfig {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RunConfig {}

impl PartialOrd for RunConfig {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RunConfig {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_fill(other).then(self.size.cmp(&other.size))
    }
}

impl fmt::Display for RunConfig {
    /// One summary line: dimensions, steps, and every measured raw minimum.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   N={}", self.size)?;
        if let Some(nonzeros) = self.nonzeros {
            write!(f, ", F={nonzeros}")?;
        }
        write!(f, ", steps={}", self.steps)?;
        for backend in Backend::ALL {
            if let Some(secs) = self.result(backend) {
                write!(f, ", {}={:.6e}s", backend.label(), secs)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_runs_order_by_size() {
        let mut runs = vec![RunConfig::new(500), RunConfig::new(10), RunConfig::new(100)];
        runs.sort();
        let sizes: Vec<usize> = runs.iter().map(RunConfig::size).collect();
        assert_eq!(sizes, vec![10, 100, 500]);
    }

    #[test]
    fn sparse_runs_order_by_fill_then_size() {
        let mut runs = vec![
            RunConfig::sparse(100, 50),  // 50%
            RunConfig::sparse(1_000, 10), // 1%
            RunConfig::sparse(100, 1),   // 1%
            RunConfig::sparse(10, 1),    // 10%
        ];
        runs.sort();
        let points: Vec<(usize, Option<usize>)> =
            runs.iter().map(|r| (r.size(), r.nonzeros())).collect();
        assert_eq!(
            points,
            vec![
                (100, Some(1)),
                (1_000, Some(10)),
                (10, Some(1)),
                (100, Some(50)),
            ]
        );
    }

    #[test]
    fn equal_fill_ratios_group_together() {
        let a = RunConfig::sparse(100, 1);
        let b = RunConfig::sparse(1_000, 10);
        let c = RunConfig::sparse(1_000, 11);
        assert!(a.same_fill(&b));
        assert!(!a.same_fill(&c));

        let dense_a = RunConfig::new(100);
        let dense_b = RunConfig::new(200);
        assert!(dense_a.same_fill(&dense_b));
        assert!(!dense_a.same_fill(&a));
    }

    #[test]
    fn fill_degree_is_a_percentage() {
        let run = RunConfig::sparse(1_000, 50);
        assert_eq!(run.fill_degree(), Some(5.0));
        assert_eq!(RunConfig::new(1_000).fill_degree(), None);
    }

    #[test]
    fn throughput_scales_with_the_inverse_of_time() {
        let mut run = RunConfig::new(100).with_steps(18);
        run.set_flops(100);
        run.set_result(Backend::Native, 0.5);
        run.set_result(Backend::Nalgebra, 2.0);

        let native = run.mflops(Backend::Native).unwrap();
        let nalgebra = run.mflops(Backend::Nalgebra).unwrap();
        // 100 flops * 18 steps / 0.5 s = 3600 flop/s.
        assert!((native - 3.6e-3).abs() < 1e-12);
        // Four times the time, a quarter of the throughput.
        assert!((native / nalgebra - 4.0).abs() < 1e-9);
        assert_eq!(run.mflops(Backend::Ndarray), None);
    }

    #[test]
    #[should_panic(expected = "already fixed")]
    fn steps_resolve_only_once() {
        let mut run = RunConfig::new(100).with_steps(4);
        run.set_steps(8);
    }

    #[test]
    #[should_panic(expected = "at least 1")]
    fn zero_steps_are_rejected() {
        RunConfig::new(100).with_steps(0);
    }

    #[test]
    fn summary_line_lists_measured_backends_only() {
        let mut run = RunConfig::sparse(1_000, 50).with_steps(7);
        run.set_flops(50);
        run.set_result(Backend::Native, 1.25e-3);

        let line = run.to_string();
        assert!(line.contains("N=1000"));
        assert!(line.contains("F=50"));
        assert!(line.contains("steps=7"));
        assert!(line.contains("native=1.250000e-3s"));
        assert!(!line.contains("nalgebra"));
    }
}
