//! Kernels implemented with `nalgebra` and `nalgebra-sparse`.
//!
//! Dense kernels use the library's non-allocating entry points (`add_to`,
//! `axpy`, `mul_to`); the sparse kernels go through the operator overloads,
//! which is how the library expects compressed structures to be combined.
//! Operands are drawn in the same order as the native backend, so the
//! numbers match element for element.

use nalgebra::{DMatrix, DVector, Matrix3, RowVector3};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rand::Rng;

use crate::config::Config;
use crate::diag::Diagnostics;
use crate::error::SweepError;
use crate::inputs;
use crate::kernels::{Kernel, KernelCheck, KERNEL_SCALAR};
use crate::measurement::{black_box, stabilized_min};
use crate::run::RunConfig;

/// Prepared operand state for one nalgebra kernel run.
pub(crate) enum NalgebraKernel {
    DVecDVecAdd {
        a: DVector<f64>,
        b: DVector<f64>,
        c: DVector<f64>,
    },
    Daxpy {
        x: DVector<f64>,
        y: DVector<f64>,
    },
    DMatDVecMult {
        a: DMatrix<f64>,
        x: DVector<f64>,
        y: DVector<f64>,
    },
    DMatDMatMult {
        a: DMatrix<f64>,
        b: DMatrix<f64>,
        c: DMatrix<f64>,
    },
    TVec3Mat3Mult {
        a: Vec<RowVector3<f64>>,
        m: Vec<Matrix3<f64>>,
        b: Vec<RowVector3<f64>>,
    },
    SVecScalarMult {
        a: CsrMatrix<f64>,
        b: CsrMatrix<f64>,
    },
    SMatDVecMult {
        a: CsrMatrix<f64>,
        x: DVector<f64>,
        y: DVector<f64>,
    },
}

impl NalgebraKernel {
    /// Generate operands for `run`, following the shared draw order.
    pub(crate) fn prepare(kernel: Kernel, run: &RunConfig, config: &Config) -> Self {
        let n = run.size();
        let rng = &mut inputs::run_rng(config.seed, kernel, n, run.nonzeros());
        match kernel {
            Kernel::DVecDVecAdd => Self::DVecDVecAdd {
                a: DVector::from_vec(inputs::uniform_values(rng, n)),
                b: DVector::from_vec(inputs::uniform_values(rng, n)),
                c: DVector::zeros(n),
            },
            Kernel::Daxpy => Self::Daxpy {
                x: DVector::from_vec(inputs::uniform_values(rng, n)),
                y: DVector::from_vec(inputs::uniform_values(rng, n)),
            },
            Kernel::DMatDVecMult => Self::DMatDVecMult {
                a: DMatrix::from_row_slice(n, n, &inputs::uniform_values(rng, n * n)),
                x: DVector::from_vec(inputs::uniform_values(rng, n)),
                y: DVector::zeros(n),
            },
            Kernel::DMatDMatMult => Self::DMatDMatMult {
                a: DMatrix::from_row_slice(n, n, &inputs::uniform_values(rng, n * n)),
                b: DMatrix::from_row_slice(n, n, &inputs::uniform_values(rng, n * n)),
                c: DMatrix::zeros(n, n),
            },
            Kernel::TVec3Mat3Mult => {
                let mut a = Vec::with_capacity(n);
                let mut m = Vec::with_capacity(n);
                for _ in 0..n {
                    a.push(RowVector3::new(rng.random(), rng.random(), rng.random()));
                    #[rustfmt::skip]
                    let mat = Matrix3::new(
                        rng.random(), rng.random(), rng.random(),
                        rng.random(), rng.random(), rng.random(),
                        rng.random(), rng.random(), rng.random(),
                    );
                    m.push(mat);
                }
                Self::TVec3Mat3Mult {
                    a,
                    m,
                    b: vec![RowVector3::zeros(); n],
                }
            }
            Kernel::SVecScalarMult => {
                let f = run.nonzeros().unwrap_or(0);
                let indices = inputs::unique_indices(rng, n, f);
                let values = inputs::uniform_values(rng, f);
                // A sparse vector is an n x 1 compressed matrix here.
                let mut coo = CooMatrix::new(n, 1);
                for (&i, &v) in indices.iter().zip(&values) {
                    coo.push(i, 0, v);
                }
                Self::SVecScalarMult {
                    a: CsrMatrix::from(&coo),
                    b: CsrMatrix::zeros(n, 1),
                }
            }
            Kernel::SMatDVecMult => {
                let f = run.nonzeros().unwrap_or(0);
                let mut coo = CooMatrix::new(n, n);
                for row in 0..n {
                    let indices = inputs::unique_indices(rng, n, f);
                    let values = inputs::uniform_values(rng, f);
                    for (&j, &v) in indices.iter().zip(&values) {
                        coo.push(row, j, v);
                    }
                }
                Self::SMatDVecMult {
                    a: CsrMatrix::from(&coo),
                    x: DVector::from_vec(inputs::uniform_values(rng, n)),
                    y: DVector::zeros(n),
                }
            }
        }
    }

    /// One untimed evaluation; the pooled kernel touches every instance.
    pub(crate) fn warmup(&mut self) {
        let steps = match self {
            Self::TVec3Mat3Mult { a, .. } => a.len(),
            _ => 1,
        };
        let _ = self.run(steps);
    }

    /// Execute `steps` kernel evaluations and check the result.
    pub(crate) fn run(&mut self, steps: usize) -> KernelCheck {
        match self {
            Self::DVecDVecAdd { a, b, c } => {
                for _ in 0..steps {
                    black_box(&*a).add_to(black_box(&*b), c);
                    black_box(&mut *c);
                }
                check_vector(c, a.len())
            }
            Self::Daxpy { x, y } => {
                for _ in 0..steps {
                    y.axpy(KERNEL_SCALAR, black_box(&*x), 1.0);
                    black_box(&mut *y);
                }
                check_vector(y, x.len())
            }
            Self::DMatDVecMult { a, x, y } => {
                for _ in 0..steps {
                    black_box(&*a).mul_to(black_box(&*x), y);
                    black_box(&mut *y);
                }
                check_vector(y, x.len())
            }
            Self::DMatDMatMult { a, b, c } => {
                for _ in 0..steps {
                    black_box(&*a).mul_to(black_box(&*b), c);
                    black_box(&mut *c);
                }
                KernelCheck::expect_that(
                    c.len() == a.len() && c[0].is_finite() && c[0] >= 0.0,
                    "implausible output value",
                )
            }
            Self::TVec3Mat3Mult { a, m, b } => {
                let pool = a.len();
                let mut l = 0;
                for _ in 0..steps {
                    if l == pool {
                        l = 0;
                    }
                    b[l] = black_box(a[l]) * black_box(m[l]);
                    l += 1;
                }
                black_box(&mut b[..]);
                KernelCheck::expect_that(
                    b.first().is_some_and(|v| v[0].is_finite() && v[0] >= 0.0),
                    "implausible output value",
                )
            }
            Self::SVecScalarMult { a, b } => {
                for _ in 0..steps {
                    *b = black_box(&*a) * KERNEL_SCALAR;
                    black_box(&mut *b);
                }
                KernelCheck::expect_that(
                    b.nnz() == a.nnz() && b.nrows() == a.nrows(),
                    "output structure mismatch",
                )
            }
            Self::SMatDVecMult { a, x, y } => {
                for _ in 0..steps {
                    *y = black_box(&*a) * black_box(&*x);
                    black_box(&mut *y);
                }
                check_vector(y, x.len())
            }
        }
    }
}

fn check_vector(v: &DVector<f64>, expected_len: usize) -> KernelCheck {
    if v.len() != expected_len {
        return KernelCheck::Failed("output length mismatch");
    }
    KernelCheck::expect_that(
        v[0].is_finite() && v[0] >= 0.0,
        "implausible output value",
    )
}

/// Stabilized measurement of one calibrated run.
pub(crate) fn measure(
    kernel: Kernel,
    run: &RunConfig,
    config: &Config,
    diag: &mut Diagnostics,
) -> Result<f64, SweepError> {
    let mut state = NalgebraKernel::prepare(kernel, run, config);
    state.warmup();
    let context = format!("nalgebra '{}'", kernel.label());
    let measurement = stabilized_min(&context, run.steps(), |steps| state.run(steps), config, diag);
    Ok(measurement.min_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kernel_prepares_and_passes_its_check() {
        let config = Config::quick();
        for kernel in Kernel::ALL {
            let run = if kernel.is_sparse() {
                RunConfig::sparse(32, 8)
            } else {
                RunConfig::new(32)
            };
            let mut state = NalgebraKernel::prepare(kernel, &run, &config);
            state.warmup();
            assert_eq!(state.run(3), KernelCheck::Ok, "kernel {kernel}");
        }
    }

    #[test]
    fn sparse_vector_keeps_its_nonzero_structure() {
        let config = Config::quick();
        let run = RunConfig::sparse(100, 10);
        let mut state = NalgebraKernel::prepare(Kernel::SVecScalarMult, &run, &config);
        assert_eq!(state.run(2), KernelCheck::Ok);
        match &state {
            NalgebraKernel::SVecScalarMult { a, b } => {
                assert_eq!(a.nnz(), 10);
                assert_eq!(b.nnz(), 10);
                // b = 3 * a, entry by entry.
                for (av, bv) in a.values().iter().zip(b.values()) {
                    assert!((bv - 3.0 * av).abs() < 1e-12);
                }
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn operands_match_the_native_draws() {
        let config = Config::quick();
        let run = RunConfig::new(16);
        let state = NalgebraKernel::prepare(Kernel::DVecDVecAdd, &run, &config);
        let mut rng = inputs::run_rng(config.seed, Kernel::DVecDVecAdd, 16, None);
        let expected = inputs::uniform_values(&mut rng, 16);
        match &state {
            NalgebraKernel::DVecDVecAdd { a, .. } => {
                assert_eq!(a.as_slice(), expected.as_slice());
            }
            _ => unreachable!(),
        }
    }
}
