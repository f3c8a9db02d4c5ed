//! Diagnostics: non-fatal anomalies observed during a sweep.
//!
//! Diagnostics never abort a sweep. They are collected in order, attached to
//! the final report, and optionally echoed to stderr as they occur so that a
//! long sweep shows its warnings interleaved with progress output.

use serde::{Deserialize, Serialize};

/// A non-fatal anomaly recorded during calibration or measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A kernel result failed its cheap sanity predicate.
    ///
    /// The measurement continues; the timing numbers of the affected run
    /// should be treated with suspicion.
    CheckFailed {
        /// Which backend/kernel combination produced the bad result.
        context: String,
        /// What the predicate rejected.
        reason: String,
    },

    /// The minimum and mean trial times diverged beyond the tolerance.
    ///
    /// Flags that the reported minimum may not represent steady-state
    /// performance.
    HighVariance {
        /// Which backend/kernel combination was being measured.
        context: String,
        /// Minimum trial time in seconds.
        min_secs: f64,
        /// Mean trial time in seconds.
        mean_secs: f64,
        /// The tolerance that was exceeded, in percent.
        tolerance_pct: f64,
    },

    /// The wall clock cannot resolve intervals finer than this.
    CoarseTimer {
        /// Estimated clock resolution in seconds.
        resolution_secs: f64,
    },

    /// A backend failed mid-sweep; its remaining runs were skipped.
    BackendAborted {
        /// Label of the backend that failed.
        backend: String,
        /// Number of runs that were skipped, including the failing one.
        remaining: usize,
        /// The failure.
        reason: String,
    },
}

impl Diagnostic {
    /// Human-readable one-line description.
    pub fn message(&self) -> String {
        match self {
            Diagnostic::CheckFailed { context, reason } => {
                format!("{context}: error detected in kernel result ({reason})")
            }
            Diagnostic::HighVariance {
                context,
                min_secs,
                mean_secs,
                tolerance_pct,
            } => format!(
                "{context}: trial times varied beyond {tolerance_pct}% \
                 (min {min_secs:.3e} s, mean {mean_secs:.3e} s)"
            ),
            Diagnostic::CoarseTimer { resolution_secs } => format!(
                "wall clock resolution is only {resolution_secs:.3e} s; \
                 short kernels may be under-resolved"
            ),
            Diagnostic::BackendAborted {
                backend,
                remaining,
                reason,
            } => format!("backend '{backend}' aborted, skipping {remaining} run(s): {reason}"),
        }
    }
}

/// Ordered collection of diagnostics for one sweep.
///
/// When `echo` is enabled every recorded event is also written to stderr
/// immediately, prefixed with `[flopmark]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    events: Vec<Diagnostic>,
    #[serde(skip)]
    echo: bool,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new(echo: bool) -> Self {
        Self {
            events: Vec::new(),
            echo,
        }
    }

    /// Record an event, echoing it to stderr if enabled.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        if self.echo {
            eprintln!("[flopmark] warning: {}", diagnostic.message());
        }
        self.events.push(diagnostic);
    }

    /// All recorded events, in the order they occurred.
    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of recorded high-variance warnings.
    pub fn variance_warnings(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Diagnostic::HighVariance { .. }))
            .count()
    }

    /// Number of recorded sanity-check failures.
    pub fn check_failures(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Diagnostic::CheckFailed { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut diag = Diagnostics::new(false);
        diag.record(Diagnostic::CoarseTimer {
            resolution_secs: 1e-3,
        });
        diag.record(Diagnostic::CheckFailed {
            context: "native 'daxpy'".into(),
            reason: "negative output".into(),
        });

        assert_eq!(diag.len(), 2);
        assert!(matches!(diag.events()[0], Diagnostic::CoarseTimer { .. }));
        assert_eq!(diag.check_failures(), 1);
        assert_eq!(diag.variance_warnings(), 0);
    }

    #[test]
    fn messages_carry_context() {
        let event = Diagnostic::HighVariance {
            context: "nalgebra 'dmatdvecmult'".into(),
            min_secs: 0.10,
            mean_secs: 0.13,
            tolerance_pct: 10.0,
        };
        let text = event.message();
        assert!(text.contains("nalgebra 'dmatdvecmult'"));
        assert!(text.contains("10%"));
    }
}
