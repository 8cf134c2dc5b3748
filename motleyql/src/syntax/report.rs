//! Caret diagnostics
//!
//! ```text
//! SELECT * FROM models LIMIT 0
//!                            ^
//! at LIMIT: expected count, found '0' (count must be a positive integer)
//! ```

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub query: String,
    /// Characters before the caret
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(query: &str, offset: usize, message: &str) -> Self {
        let offset = offset.min(query.len());
        let column = query
            .char_indices()
            .take_while(|(index, _)| *index < offset)
            .count();

        Self {
            query: query.to_string(),
            column,
            message: message.to_string(),
        }
    }

    pub fn caret_line(&self) -> String {
        format!("{}^", " ".repeat(self.column))
    }

    pub fn lines(&self) -> [String; 3] {
        [self.query.clone(), self.caret_line(), self.message.clone()]
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.query)?;
        writeln!(f, "{}", self.caret_line())?;
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_under_offset() {
        let diagnostic = Diagnostic::new("SELECT * FROM models LIMIT 0", 27, "bad count");
        assert_eq!(
            diagnostic.to_string(),
            "SELECT * FROM models LIMIT 0\n                           ^\nbad count"
        );
    }

    #[test]
    fn test_caret_at_end_of_input() {
        let diagnostic = Diagnostic::new("SELECT", 6, "expected field");
        assert_eq!(diagnostic.caret_line(), "      ^");
    }

    #[test]
    fn test_caret_counts_characters() {
        let diagnostic = Diagnostic::new("x = 'é' y", 9, "m");
        assert_eq!(diagnostic.column, 8);
    }
}
