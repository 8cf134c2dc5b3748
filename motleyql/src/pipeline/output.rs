use super::result::{LocatedPlan, PipelineResult};
use crate::syntax::ParseError;
use serde::{Deserialize, Serialize};

/// A parse failure flattened for JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub line: u32,
    pub code: String,
    pub kind: String,
    pub message: String,
    /// Byte offset within the query
    pub position: usize,
    pub diagnostic: String,
}

impl ErrorReport {
    pub fn from_parse_error(error: &ParseError, line: u32) -> Self {
        Self {
            line,
            code: error.error_code().as_str().to_string(),
            kind: error.kind().as_str().to_string(),
            message: error.to_string(),
            position: error.position,
            diagnostic: error.render_diagnostic(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub file: String,
    pub plans: Vec<LocatedPlan>,
    pub error: Option<ErrorReport>,
}

impl PipelineOutput {
    pub fn from_result(result: &PipelineResult) -> Self {
        Self {
            file: result.file_metadata.path.display().to_string(),
            plans: result.plans.clone(),
            error: result
                .failure
                .as_ref()
                .map(|failure| ErrorReport::from_parse_error(&failure.error, failure.line)),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
