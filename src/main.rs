#![forbid(unsafe_code)]

use anyhow::Result;
use procgate::{cli, gate};

fn main() -> Result<()> {
    let options = cli::parse_args()?;

    // Graceful degradation if a global logger is already installed
    if let Err(e) = gate::logging::init_logging(options.verbose) {
        eprintln!("Warning: {}", e);
    }

    gate::run(&options)
}
