//! Error types for sweep setup and execution.

use thiserror::Error;

use crate::backends::Backend;
use crate::kernels::Kernel;

/// Errors that abort a sweep.
///
/// Setup errors (`Params`, `UnsupportedBackend`, `EmptySelection`, `NoRuns`,
/// `MissingFill`) are reported before any measurement starts. `Io` can also
/// occur mid-sweep when writing progress output fails.
#[derive(Debug, Error)]
pub enum SweepError {
    /// A parameter line could not be parsed or failed validation.
    #[error("parameter line {line}: {reason}")]
    Params {
        /// 1-based line number in the parameter input.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// A selected backend cannot execute the requested kernel.
    #[error("backend '{backend}' does not support kernel '{kernel}'")]
    UnsupportedBackend {
        /// The backend that was selected.
        backend: Backend,
        /// The kernel it cannot run.
        kernel: Kernel,
    },

    /// The backend selection enables no backend at all.
    #[error("no backend selected")]
    EmptySelection,

    /// The sweep was started without any run configuration.
    #[error("no run configurations supplied")]
    NoRuns,

    /// A sparse kernel was given a run without a non-zero count.
    #[error("sparse kernel '{kernel}' requires a non-zero count for size {size}")]
    MissingFill {
        /// The sparse kernel being swept.
        kernel: Kernel,
        /// The problem size of the offending run.
        size: usize,
    },

    /// A run configuration carries dimensions the kernel cannot use.
    #[error("run with size {size}: {reason}")]
    InvalidRun {
        /// The problem size of the offending run.
        size: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Writing progress or report output failed.
    #[error("output failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = SweepError::UnsupportedBackend {
            backend: Backend::Ndarray,
            kernel: Kernel::SVecScalarMult,
        };
        let text = err.to_string();
        assert!(text.contains("ndarray"));
        assert!(text.contains("svecscalarmult"));

        let err = SweepError::Params {
            line: 3,
            reason: "invalid size 'abc'".into(),
        };
        assert!(err.to_string().contains("line 3"));
    }
}
