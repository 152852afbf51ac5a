use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod convert;
mod fields;
mod info;

pub use config::Config;

/// zmes - Instrument export file reader
#[derive(Parser)]
#[command(name = "zmes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the contents of an export file
    Info {
        /// Input export file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the parameter tree of every record
        #[arg(long)]
        tree: bool,
    },

    /// Convert an export file to JSON
    ///
    /// The output is meant for downstream tools, not for reading back:
    /// non-finite array elements have no JSON form and are written as null.
    Convert {
        /// Input export file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output JSON path (stdout when omitted)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Write projected measurements instead of the parsed file
        #[arg(short, long)]
        measurements: bool,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,

        /// Do not load or decode array blobs
        #[arg(long)]
        skip_blobs: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the active projection table as TOML
    Fields {
        /// Load the table from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Info { file, tree } => info::run(file, tree),
        Commands::Convert {
            input,
            output,
            measurements,
            pretty,
            skip_blobs,
            config,
        } => convert::run(input, output, measurements, pretty, skip_blobs, config),
        Commands::Fields { config } => fields::run(config),
    }
}
