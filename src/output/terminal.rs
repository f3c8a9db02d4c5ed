//! Terminal output formatting for sweep progress and reports.

use colored::Colorize;

use crate::backends::Backend;
use crate::kernels::Kernel;
use crate::report::SweepReport;
use crate::run::RunConfig;

/// Banner introducing a sweep.
pub fn banner(kernel: Kernel) -> String {
    let sep = "\u{2500}".repeat(62);
    format!("flopmark: {}\n{}", kernel.title(), sep)
}

/// Header introducing one backend group at a given fill degree.
///
/// Dense groups carry no fill annotation; sparse groups show the non-zero
/// share of their structures.
pub fn group_header(backend: Backend, fill_degree: Option<f64>) -> String {
    match fill_degree {
        Some(fill) => format!("   {} ({fill}% filled) [MFlop/s]:", backend.label().bold()),
        None => format!("   {} [MFlop/s]:", backend.label().bold()),
    }
}

/// One progress line: problem size against measured throughput.
pub fn progress_line(run: &RunConfig, backend: Backend) -> String {
    match run.mflops(backend) {
        Some(rate) => format!("     {:<12}{rate:.2}", run.size()),
        None => format!("     {:<12}{}", run.size(), "n/a".dimmed()),
    }
}

/// Header for the raw-times block at the end of a sweep.
pub fn summary_header() -> String {
    "Raw minimum times per run:".bold().to_string()
}

/// Render a complete report for human consumption.
///
/// Reproduces the layout a live sweep writes as progress: one group per
/// backend and fill degree, followed by the raw-times summary and any
/// recorded diagnostics.
pub fn format_report(report: &SweepReport) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str(&banner(report.kernel));
    output.push('\n');

    for backend in report.measured_backends() {
        let mut index = 0;
        while index < report.runs.len() {
            let group_start = index;
            output.push('\n');
            output.push_str(&group_header(
                backend,
                report.runs[group_start].fill_degree(),
            ));
            output.push('\n');
            while index < report.runs.len()
                && report.runs[index].same_fill(&report.runs[group_start])
            {
                output.push_str(&progress_line(&report.runs[index], backend));
                output.push('\n');
                index += 1;
            }
        }
    }

    output.push('\n');
    output.push_str(&summary_header());
    output.push('\n');
    for run in &report.runs {
        output.push_str(&run.to_string());
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&sep);
    output.push('\n');
    if report.diagnostics.is_empty() {
        output.push_str(&format!("  {}\n", "\u{2713} No anomalies recorded".green()));
    } else {
        let headline = format!(
            "\u{26A0} {} anomaly(ies) recorded",
            report.diagnostics.len()
        );
        output.push_str(&format!("  {}\n", headline.yellow().bold()));
        for event in report.diagnostics.events() {
            output.push_str(&format!("    {}\n", event.message()));
        }
    }
    output.push_str(&format!(
        "  Runtime: {:.1} s\n",
        report.metadata.runtime_secs
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::Selection;
    use crate::config::Config;
    use crate::diag::{Diagnostic, Diagnostics};
    use crate::report::Metadata;

    fn make_report() -> SweepReport {
        let mut small = RunConfig::sparse(100, 1).with_steps(200);
        small.set_flops(1);
        small.set_result(Backend::Native, 0.5);
        small.set_result(Backend::Nalgebra, 1.0);

        let mut large = RunConfig::sparse(100, 50).with_steps(20);
        large.set_flops(50);
        large.set_result(Backend::Native, 0.25);
        large.set_result(Backend::Nalgebra, 0.5);

        let mut diagnostics = Diagnostics::new(false);
        diagnostics.record(Diagnostic::HighVariance {
            context: "native 'svecscalarmult'".into(),
            min_secs: 0.10,
            mean_secs: 0.13,
            tolerance_pct: 5.0,
        });

        SweepReport {
            kernel: Kernel::SVecScalarMult,
            selection: Selection::none()
                .with(Backend::Native)
                .with(Backend::Nalgebra),
            backend_order: Backend::ALL.iter().map(|b| b.label().to_string()).collect(),
            runs: vec![small, large],
            diagnostics,
            metadata: Metadata {
                config: Config::quick(),
                timer_resolution_secs: 2.0e-8,
                runtime_secs: 3.25,
                calibrated_runs: 2,
                shortcut_runs: 0,
                explicit_runs: 0,
            },
        }
    }

    #[test]
    fn report_groups_by_fill_degree() {
        colored::control::set_override(false);
        let output = format_report(&make_report());
        colored::control::unset_override();

        assert!(output.contains("flopmark: Sparse Vector/Scalar Multiplication"));
        assert!(output.contains("native (1% filled) [MFlop/s]:"));
        assert!(output.contains("native (50% filled) [MFlop/s]:"));
        assert!(output.contains("nalgebra (1% filled) [MFlop/s]:"));
        assert!(output.contains("Raw minimum times"));
        assert!(output.contains("anomaly(ies) recorded"));
        assert!(output.contains("Runtime: 3.2 s"));
    }

    #[test]
    fn progress_line_shows_throughput() {
        colored::control::set_override(false);
        let mut run = RunConfig::new(1_000).with_steps(10);
        run.set_flops(1_000);
        run.set_result(Backend::Native, 0.001);
        // 1000 flops * 10 steps / 0.001 s = 10 MFlop/s.
        let line = progress_line(&run, Backend::Native);
        colored::control::unset_override();
        assert!(line.contains("1000"));
        assert!(line.contains("10.00"));
    }

    #[test]
    fn unmeasured_backend_shows_na() {
        colored::control::set_override(false);
        let run = RunConfig::new(64).with_steps(1);
        let line = progress_line(&run, Backend::Ndarray);
        colored::control::unset_override();
        assert!(line.contains("n/a"));
    }
}
