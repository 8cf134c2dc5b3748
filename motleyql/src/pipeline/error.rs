use crate::file_processor::FileProcessorError;
use crate::logging::{codes, Code};
use crate::syntax::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Query on line {line} failed: {source}")]
    Query {
        line: u32,
        #[source]
        source: ParseError,
    },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::FileProcessing(e) => e.error_code(),
            PipelineError::Query { source, .. } => source.error_code(),
            PipelineError::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}
