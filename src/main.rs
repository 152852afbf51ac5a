//! # zmes
//!
//! A command-line tool for inspecting instrument export files and converting
//! them to JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Show the records and parameter trees of a file
//! zmes info measurement.zmes --tree
//!
//! # Convert the parsed file to JSON
//! zmes convert measurement.zmes measurement.json --pretty
//!
//! # Convert to instrument-independent measurements
//! zmes convert measurement.zmes --measurements
//!
//! # Dump the built-in projection table as a starting point for a config
//! zmes fields > zmes.toml
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
