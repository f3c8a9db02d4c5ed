//! The kernel catalog: operations the harness knows how to benchmark.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar factor used by the scalar-multiplication and daxpy kernels.
pub(crate) const KERNEL_SCALAR: f64 = 3.0;

/// Verdict of a kernel's cheap output sanity predicate.
///
/// The predicate exists to catch silently wrong results (wrong output shape,
/// impossible values), not to verify numerics. A failure is recorded as a
/// diagnostic and the measurement continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelCheck {
    /// The result looks plausible.
    Ok,
    /// The result is structurally wrong.
    Failed(&'static str),
}

impl KernelCheck {
    /// `Ok` when `plausible` holds, `Failed(reason)` otherwise.
    pub fn expect_that(plausible: bool, reason: &'static str) -> Self {
        if plausible {
            KernelCheck::Ok
        } else {
            KernelCheck::Failed(reason)
        }
    }

    /// The failure reason, if any.
    pub fn failure(self) -> Option<&'static str> {
        match self {
            KernelCheck::Ok => None,
            KernelCheck::Failed(reason) => Some(reason),
        }
    }
}

/// One benchmarkable linear-algebra operation.
///
/// Dense kernels are parameterized by the problem size alone; sparse kernels
/// additionally carry a non-zero count. `TVec3Mat3Mult` is the odd one out:
/// its operands are fixed at dimension 3 and the problem size selects how
/// many independent instances are cycled through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    /// `c = a + b` over dense vectors of length N.
    DVecDVecAdd,
    /// `y += 3 * x` over dense vectors of length N.
    Daxpy,
    /// `y = A * x` with a dense N x N matrix.
    DMatDVecMult,
    /// `C = A * B` with dense N x N matrices.
    DMatDMatMult,
    /// `b^T = a^T * A` over a pool of N independent 3D instances.
    TVec3Mat3Mult,
    /// `b = 3 * a` over a compressed vector with F non-zeros.
    SVecScalarMult,
    /// `y = A * x` with a CSR matrix holding F non-zeros per row.
    SMatDVecMult,
}

impl Kernel {
    /// Every kernel, in catalog order.
    pub const ALL: [Kernel; 7] = [
        Kernel::DVecDVecAdd,
        Kernel::Daxpy,
        Kernel::DMatDVecMult,
        Kernel::DMatDMatMult,
        Kernel::TVec3Mat3Mult,
        Kernel::SVecScalarMult,
        Kernel::SMatDVecMult,
    ];

    /// Lowercase identifier, used in parameter files and progress output.
    pub fn label(self) -> &'static str {
        match self {
            Kernel::DVecDVecAdd => "dvecdvecadd",
            Kernel::Daxpy => "daxpy",
            Kernel::DMatDVecMult => "dmatdvecmult",
            Kernel::DMatDMatMult => "dmatdmatmult",
            Kernel::TVec3Mat3Mult => "tvec3mat3mult",
            Kernel::SVecScalarMult => "svecscalarmult",
            Kernel::SMatDVecMult => "smatdvecmult",
        }
    }

    /// Human-readable benchmark title.
    pub fn title(self) -> &'static str {
        match self {
            Kernel::DVecDVecAdd => "Dense Vector/Dense Vector Addition",
            Kernel::Daxpy => "DAXPY",
            Kernel::DMatDVecMult => "Dense Matrix/Dense Vector Multiplication",
            Kernel::DMatDMatMult => "Dense Matrix/Dense Matrix Multiplication",
            Kernel::TVec3Mat3Mult => "3D Transpose Vector/Matrix Multiplication",
            Kernel::SVecScalarMult => "Sparse Vector/Scalar Multiplication",
            Kernel::SMatDVecMult => "Sparse Matrix/Dense Vector Multiplication",
        }
    }

    /// Parse a lowercase identifier as produced by [`Kernel::label`].
    pub fn from_label(label: &str) -> Option<Kernel> {
        Kernel::ALL.into_iter().find(|k| k.label() == label)
    }

    /// Whether the kernel operates on compressed structures and therefore
    /// needs a non-zero count per run.
    pub fn is_sparse(self) -> bool {
        matches!(self, Kernel::SVecScalarMult | Kernel::SMatDVecMult)
    }

    /// Whether the kernel cycles through a pool of fixed-size instances
    /// instead of scaling a single operand.
    pub fn uses_instance_pool(self) -> bool {
        matches!(self, Kernel::TVec3Mat3Mult)
    }

    /// Floating-point operations for a single evaluation of the kernel.
    ///
    /// `nonzeros` is the per-structure non-zero count F and is only
    /// meaningful for sparse kernels; dense kernels ignore it. A sparse
    /// kernel without a count yields 0 flops (such runs are rejected at
    /// sweep setup).
    pub fn flops(self, size: usize, nonzeros: Option<usize>) -> u64 {
        let n = size as u64;
        let f = nonzeros.unwrap_or(0) as u64;
        match self {
            Kernel::DVecDVecAdd => n,
            Kernel::Daxpy => 2 * n,
            Kernel::DMatDVecMult => 2 * n * n - n,
            Kernel::DMatDMatMult => 2 * n * n * n - n * n,
            Kernel::TVec3Mat3Mult => 15,
            Kernel::SVecScalarMult => f,
            Kernel::SMatDVecMult => n * (2 * f).saturating_sub(1),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flop_counts_match_operation_definitions() {
        assert_eq!(Kernel::DVecDVecAdd.flops(100, None), 100);
        assert_eq!(Kernel::Daxpy.flops(100, None), 200);
        // N multiplies plus N-1 adds per row, N rows.
        assert_eq!(Kernel::DMatDVecMult.flops(100, None), 19_900);
        assert_eq!(Kernel::DMatDMatMult.flops(10, None), 1_900);
        // 9 multiplies plus 6 adds, independent of the pool size.
        assert_eq!(Kernel::TVec3Mat3Mult.flops(1_000, None), 15);
        assert_eq!(Kernel::SVecScalarMult.flops(1_000, Some(50)), 50);
        assert_eq!(Kernel::SMatDVecMult.flops(100, Some(10)), 1_900);
    }

    #[test]
    fn sparse_kernel_without_fill_counts_zero_flops() {
        assert_eq!(Kernel::SVecScalarMult.flops(1_000, None), 0);
        assert_eq!(Kernel::SMatDVecMult.flops(1_000, None), 0);
    }

    #[test]
    fn labels_round_trip() {
        for kernel in Kernel::ALL {
            assert_eq!(Kernel::from_label(kernel.label()), Some(kernel));
        }
        assert_eq!(Kernel::from_label("dgemm"), None);
    }

    #[test]
    fn catalog_flags() {
        assert!(Kernel::SVecScalarMult.is_sparse());
        assert!(Kernel::SMatDVecMult.is_sparse());
        assert!(!Kernel::DMatDMatMult.is_sparse());
        assert!(Kernel::TVec3Mat3Mult.uses_instance_pool());
        assert!(!Kernel::Daxpy.uses_instance_pool());
    }

    #[test]
    fn expect_that_maps_to_verdicts() {
        assert_eq!(KernelCheck::expect_that(true, "unused"), KernelCheck::Ok);
        assert_eq!(
            KernelCheck::expect_that(false, "bad shape").failure(),
            Some("bad shape")
        );
    }
}
