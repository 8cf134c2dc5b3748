//! Parse failures
//!
//! Each stage has its own error enum. [`QueryError`] tags them and
//! [`ParseError`] adds where the parser stopped and what it had built.

use crate::grammar::Plan;
use crate::lexical::LexerError;
use crate::logging::codes::{self, Code, Severity};
use crate::utils::{Position, Span};
use crate::validation::SemanticError;
use thiserror::Error;

use super::report::Diagnostic;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("invalid query type: expected SELECT, found {found}")]
    InvalidQueryType { found: String, offset: usize },

    #[error("{}expected {expected}, found {found}", clause_prefix(.clause))]
    UnexpectedToken {
        clause: &'static str,
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEndOfInput { expected: &'static str },

    #[error("at LIMIT: expected count, found {found} (count must be a positive integer)")]
    InvalidCount { found: String, offset: usize },

    #[error("unexpected input after end of query: {found}")]
    TrailingInput { found: String, offset: usize },

    #[error("at {clause}: too many items (max {limit})")]
    TooManyItems {
        clause: &'static str,
        limit: usize,
        offset: usize,
    },
}

fn clause_prefix(clause: &str) -> String {
    if clause.is_empty() {
        String::new()
    } else {
        format!("at {}: ", clause)
    }
}

impl SyntaxError {
    pub fn unexpected_token(
        clause: &'static str,
        expected: &'static str,
        found: String,
        offset: usize,
    ) -> Self {
        Self::UnexpectedToken {
            clause,
            expected,
            found,
            offset,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            SyntaxError::InvalidQueryType { .. } => codes::syntax::INVALID_QUERY_TYPE,
            SyntaxError::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            SyntaxError::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            SyntaxError::InvalidCount { .. } => codes::syntax::INVALID_COUNT,
            SyntaxError::TrailingInput { .. } => codes::syntax::TRAILING_INPUT,
            SyntaxError::TooManyItems { .. } => codes::syntax::TOO_MANY_ITEMS,
        }
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical",
            ErrorKind::Syntax => "syntax",
            ErrorKind::Semantic => "semantic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Lexical(#[from] LexerError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Lexical(_) => ErrorKind::Lexical,
            QueryError::Syntax(_) => ErrorKind::Syntax,
            QueryError::Semantic(_) => ErrorKind::Semantic,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            QueryError::Lexical(e) => e.error_code(),
            QueryError::Syntax(e) => e.error_code(),
            QueryError::Semantic(e) => e.error_code(),
        }
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}

/// A failed parse: the error, the query, the cursor where parsing stopped
/// and the partially built plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct ParseError {
    pub error: QueryError,
    /// Trimmed query text the cursor refers to
    pub query: String,
    /// Byte offset of the cursor when the error was raised
    pub position: usize,
    pub partial: Plan,
}

impl ParseError {
    pub fn new(error: impl Into<QueryError>, query: &str, position: usize, partial: Plan) -> Self {
        Self {
            error: error.into(),
            query: query.to_string(),
            position,
            partial,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn error_code(&self) -> Code {
        self.error.error_code()
    }

    pub fn severity(&self) -> Severity {
        self.error.severity()
    }

    /// Cursor position, with `line` as the line the query came from
    pub fn location(&self, line: u32) -> Position {
        Position::in_query(&self.query, self.position, line)
    }

    pub fn span(&self, line: u32) -> Span {
        Span::point(self.location(line))
    }

    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::new(&self.query, self.position, &self.error.to_string())
    }

    /// Query, caret line and message, one per line
    pub fn render_diagnostic(&self) -> String {
        self.diagnostic().to_string()
    }
}
