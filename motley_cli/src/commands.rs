//! Subcommand handlers
//!
//! Each handler returns `Ok(true)` when every query parsed.

use crate::executor::{self, TracingExecutor};
use motleyql::batch::{self, BatchConfig};
use motleyql::config::runtime::RuntimeConfig;
use motleyql::pipeline::{self, PipelineOutput};
use motleyql::syntax;
use motleyql::{log_error, log_info, logging};
use std::error::Error;
use std::path::Path;

pub const DEMO_QUERIES: [&str; 3] = [
    "SELECT * FROM models",
    "SELECT * FROM models WHERE task = object_detection AND data_type = image",
    "SELECT * FROM models WHERE task = object_detection AND data_type = image \
     ORDER BY n_param DESC LIMIT 1 USING local_data RESPOND IN fast_mode",
];

pub fn parse_queries(queries: &[String], config: &RuntimeConfig) -> Result<bool, Box<dyn Error>> {
    let batch = syntax::parse_many_with_preferences(queries, config.parser.clone());

    println!("{}", serde_json::to_string_pretty(&batch.plans)?);

    match (&batch.error, batch.failed_index()) {
        (Some(error), Some(index)) => {
            eprintln!("error[{}]: query {} failed", error.error_code(), index + 1);
            eprintln!("{}", error.render_diagnostic());
            Ok(false)
        }
        _ => Ok(true),
    }
}

pub fn check_path(
    path: &Path,
    batch_config: BatchConfig,
    config: &RuntimeConfig,
) -> Result<bool, Box<dyn Error>> {
    if path.is_file() {
        check_file(path, config)
    } else if path.is_dir() {
        check_directory(path, batch_config)
    } else {
        log_error!(
            logging::codes::file_processing::INVALID_PATH,
            "Input must be a query file or directory",
            "path" => path.display()
        );
        Err(format!("not a file or directory: {}", path.display()).into())
    }
}

fn check_file(path: &Path, config: &RuntimeConfig) -> Result<bool, Box<dyn Error>> {
    let result = pipeline::process_file_with_config(path, 0, config)?;
    let output = PipelineOutput::from_result(&result);
    println!("{}", output.to_json_pretty()?);

    if let Some(report) = &output.error {
        eprintln!("error[{}]: {}:{}", report.code, path.display(), report.line);
        eprintln!("{}", report.diagnostic);
    }

    Ok(result.is_success())
}

fn check_directory(path: &Path, batch_config: BatchConfig) -> Result<bool, Box<dyn Error>> {
    let results = batch::process_directory_with_config(path, &batch_config)?;

    for (file, error) in &results.failed_files {
        eprintln!("error[{}]: {}: {}", error.error_code(), file.display(), error);
    }
    for (file, result) in &results.processed_files {
        if let Some(failure) = &result.failure {
            eprintln!(
                "error[{}]: {}:{}: {}",
                failure.error.error_code(),
                file.display(),
                failure.line,
                failure.error
            );
        }
    }

    println!("{}", results.summary());
    Ok(results.is_clean())
}

/// One-line report of what the global collector saw, if it saw any file
pub fn collected_summary_line() -> Option<String> {
    let summary = logging::get_processing_summary();
    if summary.total_files == 0 {
        return None;
    }
    Some(format!(
        "collected: {} files, {} with errors, {} with warnings ({} errors, {} warnings), {:.1}% clean",
        summary.total_files,
        summary.failed_files,
        summary.files_with_warnings,
        summary.total_errors,
        summary.total_warnings,
        summary.success_rate() * 100.0
    ))
}

pub fn run_demo(config: &RuntimeConfig) -> Result<bool, Box<dyn Error>> {
    for query in DEMO_QUERIES {
        let plan = syntax::parse_with_preferences(query, config.parser.clone())?;
        println!("{:#?}", plan);

        let mut tracer = TracingExecutor::new();
        executor::execute(&plan, &mut tracer)?;
        log_info!("Demo query executed", "stages" => tracer.stages().len());
    }
    Ok(true)
}
