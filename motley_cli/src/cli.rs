//! Command line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "motley", version, about = "Parse and check motley model-zoo queries")]
pub struct Cli {
    /// TOML file with runtime preferences
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit structured JSON log events
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse queries and print their plans as JSON
    Parse {
        #[arg(required = true, value_name = "QUERY")]
        queries: Vec<String>,
    },

    /// Check a query file or a directory of query files
    Check {
        path: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Stop at the first file with a failing query
        #[arg(long)]
        fail_fast: bool,

        /// Worker threads for directories
        #[arg(short = 'j', long, value_name = "N")]
        threads: Option<usize>,
    },

    /// Parse the demo queries and run them through the tracing executor
    Demo,
}
