use super::PipelineError;
use crate::file_processor::FileMetadata;
use crate::grammar::Plan;
use crate::syntax::ParseError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A plan and the query file line it was parsed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedPlan {
    pub line: u32,
    pub plan: Plan,
}

#[derive(Debug, Clone)]
pub struct QueryFailure {
    pub line: u32,
    pub error: ParseError,
}

/// Plans of one query file, up to its first failing query
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub file_metadata: FileMetadata,
    pub plans: Vec<LocatedPlan>,
    pub failure: Option<QueryFailure>,
    /// Queries found in the file, parsed or not
    pub query_count: usize,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn parsed_count(&self) -> usize {
        self.plans.len()
    }

    /// Queries after the failing one, which were not attempted
    pub fn skipped_count(&self) -> usize {
        match self.failure {
            Some(_) => self.query_count.saturating_sub(self.plans.len() + 1),
            None => 0,
        }
    }

    pub fn into_plans(self) -> Result<Vec<Plan>, PipelineError> {
        match self.failure {
            Some(failure) => Err(PipelineError::Query {
                line: failure.line,
                source: failure.error,
            }),
            None => Ok(self.plans.into_iter().map(|located| located.plan).collect()),
        }
    }

    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            crate::logging::codes::success::PIPELINE_COMPLETE,
            "Query file parsed",
            "file" => file_path,
            "queries" => self.query_count,
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}
