//! JSON serialization for sweep reports.

use crate::report::SweepReport;

/// Serialize a SweepReport to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for SweepReport).
pub fn to_json(report: &SweepReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a SweepReport to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for SweepReport).
pub fn to_json_pretty(report: &SweepReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{Backend, Selection};
    use crate::config::Config;
    use crate::diag::Diagnostics;
    use crate::kernels::Kernel;
    use crate::report::Metadata;
    use crate::run::RunConfig;

    fn make_report() -> SweepReport {
        let mut run = RunConfig::new(1_000).with_steps(18);
        run.set_flops(1_000);
        run.set_result(Backend::Native, 2.5e-3);

        SweepReport {
            kernel: Kernel::DVecDVecAdd,
            selection: Selection::only(Backend::Native),
            backend_order: Backend::ALL.iter().map(|b| b.label().to_string()).collect(),
            runs: vec![run],
            diagnostics: Diagnostics::new(false),
            metadata: Metadata {
                config: Config::quick(),
                timer_resolution_secs: 2.0e-8,
                runtime_secs: 4.5,
                calibrated_runs: 1,
                shortcut_runs: 0,
                explicit_runs: 0,
            },
        }
    }

    #[test]
    fn compact_json_carries_run_fields() {
        let report = make_report();
        let json = to_json(&report).unwrap();
        assert!(json.contains("\"kernel\":\"dvecdvecadd\""));
        assert!(json.contains("\"steps\":18"));
        assert!(json.contains("\"runtime_secs\":4.5"));
    }

    #[test]
    fn pretty_json_is_indented_across_lines() {
        let report = make_report();
        let json = to_json_pretty(&report).unwrap();
        assert!(json.contains('\n')); // Pretty print has newlines
        assert!(json.contains("backend_order"));
    }
}
