//! The native backend: plain loops over slices.
//!
//! This is the engine's own rendition of each kernel, with no library
//! underneath. It doubles as the calibration backend: step counts are
//! always derived from these implementations so that every backend measures
//! the same trial workload.

use rand::Rng;

use crate::config::Config;
use crate::diag::Diagnostics;
use crate::error::SweepError;
use crate::inputs;
use crate::kernels::{Kernel, KernelCheck, KERNEL_SCALAR};
use crate::measurement::{
    black_box, calibrate as calibrate_steps, stabilized_min, Calibration,
};
use crate::run::RunConfig;

/// Minimal compressed vector: ascending unique indices plus their values.
#[derive(Debug, Clone)]
pub(crate) struct CompressedVector {
    len: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl CompressedVector {
    /// An empty vector of logical length `len`.
    pub(crate) fn empty(len: usize) -> Self {
        Self {
            len,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from parts. Indices must be ascending, unique and below `len`.
    pub(crate) fn from_parts(len: usize, indices: Vec<usize>, values: Vec<f64>) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(indices.last().map_or(true, |&i| i < len));
        Self {
            len,
            indices,
            values,
        }
    }

    /// Logical length.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Stored non-zeros.
    pub(crate) fn nnz(&self) -> usize {
        self.values.len()
    }

    /// `out = self * scalar`, reusing `out`'s storage.
    pub(crate) fn scale_into(&self, scalar: f64, out: &mut Self) {
        out.len = self.len;
        out.indices.clone_from(&self.indices);
        out.values.clear();
        out.values.extend(self.values.iter().map(|v| v * scalar));
    }

    #[cfg(test)]
    pub(crate) fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Minimal CSR matrix.
#[derive(Debug, Clone)]
pub(crate) struct CsrMatrix {
    rows: usize,
    cols: usize,
    row_ptr: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Build from parts. `row_ptr` has `rows + 1` entries; each row's
    /// column indices are ascending, unique and below `cols`.
    pub(crate) fn from_parts(
        rows: usize,
        cols: usize,
        row_ptr: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(row_ptr.len(), rows + 1);
        debug_assert_eq!(col_indices.len(), values.len());
        debug_assert!(col_indices.iter().all(|&j| j < cols));
        Self {
            rows,
            cols,
            row_ptr,
            col_indices,
            values,
        }
    }

    /// Stored non-zeros.
    pub(crate) fn nnz(&self) -> usize {
        self.values.len()
    }

    /// `y = self * x`.
    pub(crate) fn mul_vec_into(&self, x: &[f64], y: &mut [f64]) {
        debug_assert_eq!(x.len(), self.cols);
        debug_assert_eq!(y.len(), self.rows);
        for (i, out) in y.iter_mut().enumerate() {
            let (lo, hi) = (self.row_ptr[i], self.row_ptr[i + 1]);
            *out = self.col_indices[lo..hi]
                .iter()
                .zip(&self.values[lo..hi])
                .map(|(&j, v)| v * x[j])
                .sum();
        }
    }
}

/// Prepared operand state for one native kernel run.
pub(crate) enum NativeKernel {
    DVecDVecAdd {
        a: Vec<f64>,
        b: Vec<f64>,
        c: Vec<f64>,
    },
    Daxpy {
        x: Vec<f64>,
        y: Vec<f64>,
    },
    DMatDVecMult {
        a: Vec<f64>,
        x: Vec<f64>,
        y: Vec<f64>,
    },
    DMatDMatMult {
        a: Vec<f64>,
        b: Vec<f64>,
        c: Vec<f64>,
        n: usize,
    },
    TVec3Mat3Mult {
        a: Vec<[f64; 3]>,
        m: Vec<[[f64; 3]; 3]>,
        b: Vec<[f64; 3]>,
    },
    SVecScalarMult {
        a: CompressedVector,
        b: CompressedVector,
    },
    SMatDVecMult {
        a: CsrMatrix,
        x: Vec<f64>,
        y: Vec<f64>,
    },
}

impl NativeKernel {
    /// Generate operands for `run` from its deterministic stream.
    ///
    /// Draw order is part of the cross-backend contract: vectors draw their
    /// elements in index order, matrices row-major, pooled instances draw
    /// the vector before the matrix, sparse structures draw indices before
    /// values (and row by row).
    pub(crate) fn prepare(kernel: Kernel, run: &RunConfig, config: &Config) -> Self {
        let n = run.size();
        let rng = &mut inputs::run_rng(config.seed, kernel, n, run.nonzeros());
        match kernel {
            Kernel::DVecDVecAdd => Self::DVecDVecAdd {
                a: inputs::uniform_values(rng, n),
                b: inputs::uniform_values(rng, n),
                c: vec![0.0; n],
            },
            Kernel::Daxpy => Self::Daxpy {
                x: inputs::uniform_values(rng, n),
                y: inputs::uniform_values(rng, n),
            },
            Kernel::DMatDVecMult => Self::DMatDVecMult {
                a: inputs::uniform_values(rng, n * n),
                x: inputs::uniform_values(rng, n),
                y: vec![0.0; n],
            },
            Kernel::DMatDMatMult => Self::DMatDMatMult {
                a: inputs::uniform_values(rng, n * n),
                b: inputs::uniform_values(rng, n * n),
                c: vec![0.0; n * n],
                n,
            },
            Kernel::TVec3Mat3Mult => {
                let mut a = Vec::with_capacity(n);
                let mut m = Vec::with_capacity(n);
                for _ in 0..n {
                    a.push([rng.random(), rng.random(), rng.random()]);
                    m.push([
                        [rng.random(), rng.random(), rng.random()],
                        [rng.random(), rng.random(), rng.random()],
                        [rng.random(), rng.random(), rng.random()],
                    ]);
                }
                Self::TVec3Mat3Mult {
                    a,
                    m,
                    b: vec![[0.0; 3]; n],
                }
            }
            Kernel::SVecScalarMult => {
                let f = run.nonzeros().unwrap_or(0);
                let indices = inputs::unique_indices(rng, n, f);
                let values = inputs::uniform_values(rng, f);
                Self::SVecScalarMult {
                    a: CompressedVector::from_parts(n, indices, values),
                    b: CompressedVector::empty(n),
                }
            }
            Kernel::SMatDVecMult => {
                let f = run.nonzeros().unwrap_or(0);
                let mut row_ptr = Vec::with_capacity(n + 1);
                let mut col_indices = Vec::with_capacity(n * f);
                let mut values = Vec::with_capacity(n * f);
                row_ptr.push(0);
                for _ in 0..n {
                    col_indices.extend(inputs::unique_indices(rng, n, f));
                    values.extend(inputs::uniform_values(rng, f));
                    row_ptr.push(col_indices.len());
                }
                Self::SMatDVecMult {
                    a: CsrMatrix::from_parts(n, n, row_ptr, col_indices, values),
                    x: inputs::uniform_values(rng, n),
                    y: vec![0.0; n],
                }
            }
        }
    }

    /// One untimed evaluation so the first trial runs warm. The pooled
    /// kernel touches every instance once.
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
                    add_into(black_box(&a[..]), black_box(&b[..]), c);
                    black_box(&mut c[..]);
                }
                check_dense(c, a.len())
            }
            Self::Daxpy { x, y } => {
                for _ in 0..steps {
                    daxpy_into(black_box(&x[..]), y);
                    black_box(&mut y[..]);
                }
                check_dense(y, x.len())
            }
            Self::DMatDVecMult { a, x, y } => {
                for _ in 0..steps {
                    matvec_into(black_box(&a[..]), black_box(&x[..]), y);
                    black_box(&mut y[..]);
                }
                check_dense(y, x.len())
            }
            Self::DMatDMatMult { a, b, c, n } => {
                for _ in 0..steps {
                    matmul_into(black_box(&a[..]), black_box(&b[..]), c, *n);
                    black_box(&mut c[..]);
                }
                check_dense(c, *n * *n)
            }
            Self::TVec3Mat3Mult { a, m, b } => {
                let pool = a.len();
                let mut l = 0;
                for _ in 0..steps {
                    if l == pool {
                        l = 0;
                    }
                    b[l] = tvec3mat3(black_box(&a[l]), black_box(&m[l]));
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
                    black_box(&*a).scale_into(KERNEL_SCALAR, b);
                    black_box(&mut *b);
                }
                KernelCheck::expect_that(
                    b.nnz() == a.nnz() && b.len() == a.len(),
                    "output structure mismatch",
                )
            }
            Self::SMatDVecMult { a, x, y } => {
                for _ in 0..steps {
                    black_box(&*a).mul_vec_into(black_box(&x[..]), y);
                    black_box(&mut y[..]);
                }
                check_dense(y, x.len())
            }
        }
    }
}

/// `c = a + b`.
fn add_into(a: &[f64], b: &[f64], c: &mut [f64]) {
    for ((out, &a), &b) in c.iter_mut().zip(a).zip(b) {
        *out = a + b;
    }
}

/// `y += 3 * x`.
fn daxpy_into(x: &[f64], y: &mut [f64]) {
    for (out, &x) in y.iter_mut().zip(x) {
        *out += KERNEL_SCALAR * x;
    }
}

/// `y = A * x` with `A` row-major square.
fn matvec_into(a: &[f64], x: &[f64], y: &mut [f64]) {
    let n = x.len();
    for (i, out) in y.iter_mut().enumerate() {
        *out = a[i * n..(i + 1) * n]
            .iter()
            .zip(x)
            .map(|(&a, &x)| a * x)
            .sum();
    }
}

/// `C = A * B`, row-major square, ikj loop order for stride-1 inner access.
fn matmul_into(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    c.fill(0.0);
    for i in 0..n {
        for k in 0..n {
            let aik = a[i * n + k];
            let b_row = &b[k * n..(k + 1) * n];
            let c_row = &mut c[i * n..(i + 1) * n];
            for (out, &b) in c_row.iter_mut().zip(b_row) {
                *out += aik * b;
            }
        }
    }
}

/// `b^T = a^T * A` for one 3D instance.
fn tvec3mat3(a: &[f64; 3], m: &[[f64; 3]; 3]) -> [f64; 3] {
    [
        a[0] * m[0][0] + a[1] * m[1][0] + a[2] * m[2][0],
        a[0] * m[0][1] + a[1] * m[1][1] + a[2] * m[2][1],
        a[0] * m[0][2] + a[1] * m[1][2] + a[2] * m[2][2],
    ]
}

fn check_dense(out: &[f64], expected_len: usize) -> KernelCheck {
    if out.len() != expected_len {
        return KernelCheck::Failed("output length mismatch");
    }
    KernelCheck::expect_that(
        out.first().is_some_and(|v| v.is_finite() && *v >= 0.0),
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
    let mut state = NativeKernel::prepare(kernel, run, config);
    state.warmup();
    let context = format!("native '{}'", kernel.label());
    let measurement = stabilized_min(&context, run.steps(), |steps| state.run(steps), config, diag);
    Ok(measurement.min_secs)
}

/// Calibrate a run's step count against the native implementation.
pub(crate) fn calibrate(
    kernel: Kernel,
    run: &RunConfig,
    config: &Config,
    diag: &mut Diagnostics,
) -> Calibration {
    let mut state = NativeKernel::prepare(kernel, run, config);
    let context = format!("native '{}'", kernel.label());
    calibrate_steps(&context, |steps| state.run(steps), config, diag)
}
