use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::version;

#[derive(Parser)]
#[command(author, version = version(), about, long_about = None)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to config file (default: built-in configuration).
    ///
    /// This can also be set with the `SLIDING_DRAWER_CONFIG` environment variable. If both are
    /// set, the command line argument takes precedence.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Validate the config file.
    Validate,
    /// Run a touch trace on virtual time and print the drawer events.
    Simulate {
        /// Path to the JSON trace.
        trace: PathBuf,
    },
    /// Play a touch trace back in real time and print the drawer events.
    Replay {
        /// Path to the JSON trace.
        trace: PathBuf,
    },
}
