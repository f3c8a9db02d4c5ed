//! Sweep the sparse matrix/vector product from a parameter listing.
//!
//! The run list uses the same `SIZE NONZEROS [STEPS]` format that
//! [`flopmark::load_runs`] reads from disk. The ndarray backend has no
//! sparse storage, so the selection drops it up front.

use flopmark::{output, Backend, Config, Kernel, Selection, Sweep, SweepError};

const PARAMS: &str = "\
# size  non-zeros per row
   100        10
   500        50
  1000       100
  5000       500   # ~10% filled throughout
";

fn main() -> Result<(), SweepError> {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let config = if quick { Config::quick() } else { Config::default() };

    let report = Sweep::new(Kernel::SMatDVecMult)
        .params(PARAMS)?
        .selection(Selection::all().without(Backend::Ndarray))
        .config(config)
        .execute(&mut std::io::stdout())?;

    println!();
    println!("{}", output::terminal::format_report(&report));
    println!();
    let json = output::json::to_json_pretty(&report).expect("report serializes");
    println!("{json}");
    Ok(())
}
