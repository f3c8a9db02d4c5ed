//! Competing backend implementations of the kernel catalog.
//!
//! Every backend implements each kernel in its own natural idiom over
//! identical, deterministically generated inputs. The engine treats them
//! uniformly: construct the operands, run one warm-up evaluation, then hand
//! a steps-closure to the stabilized measurement loop.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::diag::Diagnostics;
use crate::error::SweepError;
use crate::kernels::Kernel;
use crate::run::RunConfig;

mod nalgebra;
mod native;
mod ndarray;

/// A competing kernel implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Plain loops over slices, plus minimal compressed structures.
    Native,
    /// `nalgebra` and `nalgebra-sparse`.
    Nalgebra,
    /// `ndarray`. Dense kernels only.
    Ndarray,
}

impl Backend {
    /// Every backend, in declared measurement order. Sweeps measure and
    /// report backends in this order.
    pub const ALL: [Backend; 3] = [Backend::Native, Backend::Nalgebra, Backend::Ndarray];

    /// Number of backends, the width of per-run result slots.
    pub const COUNT: usize = 3;

    /// Lowercase identifier used in output.
    pub fn label(self) -> &'static str {
        match self {
            Backend::Native => "native",
            Backend::Nalgebra => "nalgebra",
            Backend::Ndarray => "ndarray",
        }
    }

    /// Position in [`Backend::ALL`], used to index result slots.
    pub fn index(self) -> usize {
        match self {
            Backend::Native => 0,
            Backend::Nalgebra => 1,
            Backend::Ndarray => 2,
        }
    }

    /// Whether this backend can execute `kernel`.
    ///
    /// `ndarray` has no compressed structures, so sparse kernels are out;
    /// selecting such a pair is rejected at sweep setup.
    pub fn supports(self, kernel: Kernel) -> bool {
        match self {
            Backend::Native | Backend::Nalgebra => true,
            Backend::Ndarray => !kernel.is_sparse(),
        }
    }

    /// Run the stabilized measurement protocol for one run configuration
    /// and return the minimum trial time in seconds.
    ///
    /// The run must already be calibrated (`steps >= 1`).
    pub(crate) fn measure(
        self,
        kernel: Kernel,
        run: &RunConfig,
        config: &Config,
        diag: &mut Diagnostics,
    ) -> Result<f64, SweepError> {
        match self {
            Backend::Native => native::measure(kernel, run, config, diag),
            Backend::Nalgebra => nalgebra::measure(kernel, run, config, diag),
            Backend::Ndarray => ndarray::measure(kernel, run, config, diag),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calibrate a run by timing the native implementation.
///
/// Calibration always runs on the native backend so that every backend
/// measures at the same step count and the per-run trial times stay
/// directly comparable.
pub(crate) fn calibrate_run(
    kernel: Kernel,
    run: &RunConfig,
    config: &Config,
    diag: &mut Diagnostics,
) -> crate::measurement::Calibration {
    native::calibrate(kernel, run, config, diag)
}

/// Which backends participate in a sweep.
///
/// ```
/// use flopmark::{Backend, Selection};
///
/// let dense_only = Selection::none()
///     .with(Backend::Native)
///     .with(Backend::Ndarray);
/// assert!(dense_only.contains(Backend::Ndarray));
/// assert!(!dense_only.contains(Backend::Nalgebra));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Measure the native backend.
    pub native: bool,
    /// Measure the nalgebra backend.
    pub nalgebra: bool,
    /// Measure the ndarray backend.
    pub ndarray: bool,
}

impl Selection {
    /// Every backend enabled.
    pub fn all() -> Self {
        Self {
            native: true,
            nalgebra: true,
            ndarray: true,
        }
    }

    /// No backend enabled.
    pub fn none() -> Self {
        Self {
            native: false,
            nalgebra: false,
            ndarray: false,
        }
    }

    /// A selection containing exactly one backend.
    pub fn only(backend: Backend) -> Self {
        Self::none().with(backend)
    }

    /// Enable one more backend.
    pub fn with(mut self, backend: Backend) -> Self {
        match backend {
            Backend::Native => self.native = true,
            Backend::Nalgebra => self.nalgebra = true,
            Backend::Ndarray => self.ndarray = true,
        }
        self
    }

    /// Disable one backend.
    pub fn without(mut self, backend: Backend) -> Self {
        match backend {
            Backend::Native => self.native = false,
            Backend::Nalgebra => self.nalgebra = false,
            Backend::Ndarray => self.ndarray = false,
        }
        self
    }

    /// Whether `backend` is enabled.
    pub fn contains(&self, backend: Backend) -> bool {
        match backend {
            Backend::Native => self.native,
            Backend::Nalgebra => self.nalgebra,
            Backend::Ndarray => self.ndarray,
        }
    }

    /// Enabled backends in declared measurement order.
    pub fn enabled(&self) -> impl Iterator<Item = Backend> + '_ {
        Backend::ALL.into_iter().filter(|b| self.contains(*b))
    }

    /// Number of enabled backends.
    pub fn count(&self) -> usize {
        self.enabled().count()
    }

    /// Whether nothing is enabled.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_order_is_stable() {
        assert_eq!(Backend::ALL.len(), Backend::COUNT);
        for (position, backend) in Backend::ALL.into_iter().enumerate() {
            assert_eq!(backend.index(), position);
        }
    }

    #[test]
    fn ndarray_rejects_sparse_kernels() {
        assert!(!Backend::Ndarray.supports(Kernel::SVecScalarMult));
        assert!(!Backend::Ndarray.supports(Kernel::SMatDVecMult));
        assert!(Backend::Ndarray.supports(Kernel::DMatDMatMult));
        for backend in [Backend::Native, Backend::Nalgebra] {
            for kernel in Kernel::ALL {
                assert!(backend.supports(kernel));
            }
        }
    }

    #[test]
    fn selection_builds_up_and_down() {
        let selection = Selection::none()
            .with(Backend::Native)
            .with(Backend::Nalgebra);
        assert_eq!(selection.count(), 2);
        assert!(!selection.contains(Backend::Ndarray));

        let enabled: Vec<Backend> = selection.enabled().collect();
        assert_eq!(enabled, vec![Backend::Native, Backend::Nalgebra]);

        let selection = selection.without(Backend::Native);
        assert_eq!(selection.count(), 1);
        assert!(Selection::none().is_empty());
        assert_eq!(Selection::all().count(), Backend::COUNT);
    }
}
