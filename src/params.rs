//! Line-oriented run-list parsing.
//!
//! A parameter input holds one run per line. Dense kernels take
//! `SIZE [STEPS]`, sparse kernels take `SIZE NONZEROS [STEPS]`. Everything
//! from `#` to the end of the line is a comment; blank lines are skipped.
//! An explicit step count disables calibration for that run.

use std::fs;
use std::path::Path;

use crate::error::SweepError;
use crate::kernels::Kernel;
use crate::run::RunConfig;

/// Parse a run list for `kernel` from a string.
pub fn parse_runs(kernel: Kernel, input: &str) -> Result<Vec<RunConfig>, SweepError> {
    let mut runs = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        runs.push(parse_line(kernel, line, text)?);
    }
    Ok(runs)
}

/// Read and parse a parameter file.
pub fn load_runs(kernel: Kernel, path: &Path) -> Result<Vec<RunConfig>, SweepError> {
    let input = fs::read_to_string(path)?;
    parse_runs(kernel, &input)
}

fn parse_line(kernel: Kernel, line: usize, text: &str) -> Result<RunConfig, SweepError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let expected = if kernel.is_sparse() {
        "SIZE NONZEROS [STEPS]"
    } else {
        "SIZE [STEPS]"
    };
    let (min_fields, max_fields) = if kernel.is_sparse() { (2, 3) } else { (1, 2) };
    if fields.len() < min_fields || fields.len() > max_fields {
        return Err(SweepError::Params {
            line,
            reason: format!(
                "expected {expected} for kernel '{kernel}', found {} field(s)",
                fields.len()
            ),
        });
    }

    let size = parse_field(line, fields[0], "size")?;
    if size == 0 {
        return Err(SweepError::Params {
            line,
            reason: "size must be at least 1".into(),
        });
    }

    let mut run = if kernel.is_sparse() {
        let nonzeros = parse_field(line, fields[1], "non-zero count")?;
        if nonzeros == 0 {
            return Err(SweepError::Params {
                line,
                reason: "non-zero count must be at least 1".into(),
            });
        }
        if nonzeros > size {
            return Err(SweepError::Params {
                line,
                reason: format!("non-zero count {nonzeros} exceeds size {size}"),
            });
        }
        RunConfig::sparse(size, nonzeros)
    } else {
        RunConfig::new(size)
    };

    let steps_field = if kernel.is_sparse() {
        fields.get(2)
    } else {
        fields.get(1)
    };
    if let Some(field) = steps_field {
        let steps = parse_field(line, field, "step count")?;
        if steps == 0 {
            return Err(SweepError::Params {
                line,
                reason: "step count must be at least 1".into(),
            });
        }
        run = run.with_steps(steps);
    }
    Ok(run)
}

fn parse_field(line: usize, field: &str, what: &str) -> Result<usize, SweepError> {
    field.parse().map_err(|_| SweepError::Params {
        line,
        reason: format!("invalid {what} '{field}'"),
    })
}
