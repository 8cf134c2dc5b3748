mod error;
pub mod output;
mod result;
mod validation;

pub use error::PipelineError;
pub use output::{ErrorReport, PipelineOutput};
pub use result::{LocatedPlan, PipelineResult, QueryFailure};
pub use validation::validate_pipeline;

use crate::config::runtime::RuntimeConfig;
use crate::file_processor::FileProcessor;
use crate::logging;
use crate::syntax;
use std::path::Path;
use std::time::Instant;

/// Read a query file and parse its queries in order (file -> parse_many -> plans)
pub fn process_file(file_path: &Path) -> Result<PipelineResult, PipelineError> {
    process_file_with_config(file_path, 0, &RuntimeConfig::default())
}

/// Parsing stops at the first failing query. That failure is part of the
/// result; only file-level problems are returned as errors.
pub fn process_file_with_config(
    file_path: &Path,
    file_id: usize,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();
    let display_path = file_path.display().to_string();

    logging::with_file_context(file_path.to_path_buf(), file_id, || {
        crate::log_info!("Starting query file pipeline", "file" => display_path);

        let query_file =
            FileProcessor::from_preferences(&config.file_processor).process_file(file_path)?;

        let batch = syntax::parse_many_at_lines(
            query_file
                .queries
                .iter()
                .map(|query| (query.line, query.text.as_str())),
            config.parser.clone(),
        );

        // Plans come back in file order, so the i-th plan is the i-th query
        let plans: Vec<LocatedPlan> = query_file
            .queries
            .iter()
            .zip(batch.plans)
            .map(|(query, plan)| LocatedPlan {
                line: query.line,
                plan,
            })
            .collect();
        let failure = batch.error.map(|error| QueryFailure {
            line: query_file
                .queries
                .get(plans.len())
                .map(|query| query.line)
                .unwrap_or_default(),
            error,
        });

        let result = PipelineResult {
            query_count: query_file.query_count(),
            file_metadata: query_file.metadata,
            plans,
            failure,
            processing_duration: start_time.elapsed(),
        };

        if result.is_success() {
            result.log_success(&display_path);
        } else {
            crate::log_warning!("Query file stopped at first failing query",
                "file" => display_path,
                "parsed" => result.parsed_count(),
                "skipped" => result.skipped_count()
            );
        }

        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ErrorKind;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_pipeline() {
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        assert_matches!(error, PipelineError::Pipeline { ref message } if message == "Test error");
        assert!(error.requires_halt());
    }

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.mql");
        fs::write(
            &path,
            "-- demo\nSELECT * FROM models\n\nSELECT a FROM zoo WHERE x = 'y' LIMIT 3\n",
        )
        .unwrap();

        let result = process_file(&path).unwrap();
        assert!(result.is_success());
        assert_eq!(result.query_count, 2);
        assert_eq!(result.plans[0].line, 2);
        assert_eq!(result.plans[1].line, 4);
        assert_eq!(result.plans[1].plan.count, 3);

        let plans = result.into_plans().unwrap();
        assert_eq!(plans[0].model_zoo, "models");
    }

    #[test]
    fn test_process_stops_at_failing_query() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.mql");
        fs::write(
            &path,
            "SELECT * FROM models\nSELECT * FROM models WHERE\nSELECT * FROM later\n",
        )
        .unwrap();

        let result = process_file(&path).unwrap();
        assert!(!result.is_success());
        assert_eq!(result.parsed_count(), 1);
        assert_eq!(result.skipped_count(), 1);

        let failure = result.failure.as_ref().unwrap();
        assert_eq!(failure.line, 2);
        assert_eq!(failure.error.kind(), ErrorKind::Semantic);

        let output = PipelineOutput::from_result(&result);
        let report = output.error.as_ref().unwrap();
        assert_eq!(report.line, 2);
        assert_eq!(report.code, "E060");
        assert_eq!(report.kind, "semantic");

        assert_matches!(result.into_plans(), Err(PipelineError::Query { line: 2, .. }));
    }

    #[test]
    fn test_output_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.mql");
        fs::write(&path, "SELECT name FROM models ORDER BY accuracy DESC\n").unwrap();

        let result = process_file(&path).unwrap();
        let json = PipelineOutput::from_result(&result).to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["plans"][0]["line"], 1);
        assert_eq!(value["plans"][0]["plan"]["order_by_items"][0], "accuracy");
        assert_eq!(value["plans"][0]["plan"]["desc"], true);
        assert!(value["error"].is_null());
    }

    #[test]
    fn test_missing_file_is_pipeline_error() {
        let dir = tempdir().unwrap();
        let result = process_file(&dir.path().join("nope.mql"));
        assert_matches!(result, Err(PipelineError::FileProcessing(_)));
    }
}
