//! Kernels implemented with `ndarray`.
//!
//! Dense kernels only: `ndarray` ships no compressed structures, so the
//! sparse kernels report this backend as unsupported and sweep setup
//! rejects the combination. Matrix products go through
//! `ndarray::linalg::{general_mat_mul, general_mat_vec_mul}`, the library's
//! non-allocating gemm entry points.

use ndarray::linalg::{general_mat_mul, general_mat_vec_mul};
use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::config::Config;
use crate::diag::Diagnostics;
use crate::error::SweepError;
use crate::inputs;
use crate::kernels::{Kernel, KernelCheck, KERNEL_SCALAR};
use crate::measurement::{black_box, stabilized_min};
use crate::run::RunConfig;

use super::Backend;

/// Prepared operand state for one ndarray kernel run.
pub(crate) enum NdarrayKernel {
    DVecDVecAdd {
        a: Array1<f64>,
        b: Array1<f64>,
        c: Array1<f64>,
    },
    Daxpy {
        x: Array1<f64>,
        y: Array1<f64>,
    },
    DMatDVecMult {
        a: Array2<f64>,
        x: Array1<f64>,
        y: Array1<f64>,
    },
    DMatDMatMult {
        a: Array2<f64>,
        b: Array2<f64>,
        c: Array2<f64>,
    },
    TVec3Mat3Mult {
        a: Vec<Array1<f64>>,
        m: Vec<Array2<f64>>,
        b: Vec<Array1<f64>>,
    },
}

impl NdarrayKernel {
    /// Generate operands for `run`, following the shared draw order.
    /// Returns `None` for kernels this backend cannot express.
    pub(crate) fn prepare(kernel: Kernel, run: &RunConfig, config: &Config) -> Option<Self> {
        let n = run.size();
        let rng = &mut inputs::run_rng(config.seed, kernel, n, run.nonzeros());
        // `from_shape_fn` fills in row-major order, the shared draw order.
        let state = match kernel {
            Kernel::DVecDVecAdd => Self::DVecDVecAdd {
                a: Array1::from_shape_fn(n, |_| rng.random()),
                b: Array1::from_shape_fn(n, |_| rng.random()),
                c: Array1::zeros(n),
            },
            Kernel::Daxpy => Self::Daxpy {
                x: Array1::from_shape_fn(n, |_| rng.random()),
                y: Array1::from_shape_fn(n, |_| rng.random()),
            },
            Kernel::DMatDVecMult => Self::DMatDVecMult {
                a: Array2::from_shape_fn((n, n), |_| rng.random()),
                x: Array1::from_shape_fn(n, |_| rng.random()),
                y: Array1::zeros(n),
            },
            Kernel::DMatDMatMult => Self::DMatDMatMult {
                a: Array2::from_shape_fn((n, n), |_| rng.random()),
                b: Array2::from_shape_fn((n, n), |_| rng.random()),
                c: Array2::zeros((n, n)),
            },
            Kernel::TVec3Mat3Mult => {
                let mut a = Vec::with_capacity(n);
                let mut m = Vec::with_capacity(n);
                for _ in 0..n {
                    a.push(Array1::from_shape_fn(3, |_| rng.random()));
                    m.push(Array2::from_shape_fn((3, 3), |_| rng.random()));
                }
                Self::TVec3Mat3Mult {
                    a,
                    m,
                    b: vec![Array1::zeros(3); n],
                }
            }
            Kernel::SVecScalarMult | Kernel::SMatDVecMult => return None,
        };
        Some(state)
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
                    Zip::from(&mut *c)
                        .and(black_box(&*a))
                        .and(black_box(&*b))
                        .for_each(|out, &a, &b| *out = a + b);
                    black_box(&mut *c);
                }
                check_vector(c, a.len())
            }
            Self::Daxpy { x, y } => {
                for _ in 0..steps {
                    y.scaled_add(KERNEL_SCALAR, black_box(&*x));
                    black_box(&mut *y);
                }
                check_vector(y, x.len())
            }
            Self::DMatDVecMult { a, x, y } => {
                for _ in 0..steps {
                    general_mat_vec_mul(1.0, black_box(&*a), black_box(&*x), 0.0, y);
                    black_box(&mut *y);
                }
                check_vector(y, x.len())
            }
            Self::DMatDMatMult { a, b, c } => {
                for _ in 0..steps {
                    general_mat_mul(1.0, black_box(&*a), black_box(&*b), 0.0, c);
                    black_box(&mut *c);
                }
                KernelCheck::expect_that(
                    c.len() == a.len() && c[[0, 0]].is_finite() && c[[0, 0]] >= 0.0,
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
                    b[l] = black_box(&a[l]).dot(black_box(&m[l]));
                    l += 1;
                }
                black_box(&mut b[..]);
                KernelCheck::expect_that(
                    b.first().is_some_and(|v| v[0].is_finite() && v[0] >= 0.0),
                    "implausible output value",
                )
            }
        }
    }
}

fn check_vector(v: &Array1<f64>, expected_len: usize) -> KernelCheck {
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
    let Some(mut state) = NdarrayKernel::prepare(kernel, run, config) else {
        return Err(SweepError::UnsupportedBackend {
            backend: Backend::Ndarray,
            kernel,
        });
    };
    state.warmup();
    let context = format!("ndarray '{}'", kernel.label());
    let measurement = stabilized_min(&context, run.steps(), |steps| state.run(steps), config, diag);
    Ok(measurement.min_secs)
}
