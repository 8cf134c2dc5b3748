//! # motley
//!
//! Entry point: loads preferences, starts logging and dispatches subcommands.

use clap::Parser;
use motley_cli::cli::{Cli, Command};
use motley_cli::commands;
use motleyql::batch::BatchConfig;
use motleyql::config::runtime::RuntimeConfig;
use motleyql::{log_debug, log_info, logging, pipeline};
use std::process::ExitCode;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    if cli.json {
        config.logging.use_structured_logging = true;
    }

    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;
    pipeline::validate_pipeline()?;
    log_info!("motley starting", "version" => env!("CARGO_PKG_VERSION"));
    log_debug!("Logging configured", "summary" => logging::config::get_config_summary());

    let clean = match cli.command {
        Command::Parse { queries } => commands::parse_queries(&queries, &config)?,
        Command::Check {
            path,
            recursive,
            fail_fast,
            threads,
        } => {
            let defaults = BatchConfig::default();
            let batch_config = BatchConfig {
                max_threads: threads.unwrap_or(defaults.max_threads),
                recursive,
                fail_fast,
                runtime: config.clone(),
                ..defaults
            };
            let clean = commands::check_path(&path, batch_config, &config)?;
            logging::print_cargo_style_summary();
            if let Some(line) = commands::collected_summary_line() {
                eprintln!("{}", line);
            }
            clean
        }
        Command::Demo => commands::run_demo(&config)?,
    };

    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
