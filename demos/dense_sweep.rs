//! Sweep the dense matrix/vector product over all three backends.
//!
//! Run with `cargo run --release --example dense_sweep`. Expect a few
//! minutes under the default policy; pass `--quick` for a noisy smoke run.

use flopmark::{output, Config, Kernel, RunConfig, Selection, Sweep, SweepError};

fn main() -> Result<(), SweepError> {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let config = if quick { Config::quick() } else { Config::default() };

    let sizes = [50, 100, 500, 1_000, 2_000];
    let report = Sweep::new(Kernel::DMatDVecMult)
        .runs(sizes.map(RunConfig::new))
        .selection(Selection::all())
        .config(config)
        .execute(&mut std::io::stdout())?;

    println!();
    println!("{}", output::terminal::format_report(&report));
    Ok(())
}
