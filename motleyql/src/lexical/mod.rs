//! On-demand lexical scanning
//!
//! There is no token stream. The parser asks the [`Scanner`] for the token at
//! its cursor, decides what to do with it, then pops it.

pub mod scanner;

use crate::config::compile_time::lexical::*;
use crate::logging::codes::{self, Code, Severity};
use thiserror::Error;

pub use scanner::{peek, Lexeme, LexemeKind, Scanner};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },

    #[error("query too long: {length} bytes (max {MAX_QUERY_LENGTH})")]
    QueryTooLong { length: usize },

    #[error("identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize, offset: usize },

    #[error("string literal too long: {length} bytes (max {MAX_STRING_LITERAL_LENGTH})")]
    StringTooLong { length: usize, offset: usize },
}

impl LexerError {
    pub fn error_code(&self) -> Code {
        match self {
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::UnexpectedCharacter { .. } => codes::lexical::UNEXPECTED_CHARACTER,
            LexerError::QueryTooLong { .. } => codes::lexical::QUERY_TOO_LONG,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLong { .. } => codes::lexical::STRING_TOO_LONG,
        }
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    /// Byte offset the error points at
    pub fn offset(&self) -> usize {
        match self {
            LexerError::UnterminatedString { offset }
            | LexerError::UnexpectedCharacter { offset, .. }
            | LexerError::IdentifierTooLong { offset, .. }
            | LexerError::StringTooLong { offset, .. } => *offset,
            LexerError::QueryTooLong { .. } => 0,
        }
    }
}

/// Reject queries longer than the compile-time ceiling
pub fn check_query_length(query: &str) -> Result<(), LexerError> {
    if query.len() > MAX_QUERY_LENGTH {
        return Err(LexerError::QueryTooLong {
            length: query.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_registered() {
        let errors = [
            LexerError::UnterminatedString { offset: 3 },
            LexerError::UnexpectedCharacter {
                character: '#',
                offset: 0,
            },
            LexerError::QueryTooLong { length: 1 },
            LexerError::IdentifierTooLong {
                length: 1,
                offset: 0,
            },
            LexerError::StringTooLong {
                length: 1,
                offset: 0,
            },
        ];

        for error in &errors {
            assert!(codes::get_error_metadata(error.error_code().as_str()).is_some());
            assert_eq!(error.category(), "Lexical");
        }
    }

    #[test]
    fn test_query_length_ceiling() {
        assert!(check_query_length("SELECT * FROM models").is_ok());

        let long = "a".repeat(MAX_QUERY_LENGTH + 1);
        assert_eq!(
            check_query_length(&long),
            Err(LexerError::QueryTooLong {
                length: MAX_QUERY_LENGTH + 1
            })
        );
    }
}
