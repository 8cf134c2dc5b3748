//! Reserved words and operators of the query language
//!
//! The table order is the scanner's tie-break precedence: multi-character
//! operators come before their single-character prefixes.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservedWord {
    // === PUNCTUATION ===
    OpenParen,
    CloseParen,
    GreaterEqual,
    LessEqual,
    NotEqual,
    Comma,
    Equal,
    Greater,
    Less,

    // === CLAUSE KEYWORDS ===
    Select,
    From,
    Where,
    Order,
    By,
    Asc,
    Desc,
    Limit,
    Using,
    Respond,
    In,
}

/// Scan order. `>=`, `<=` and `!=` must precede `=`, `>` and `<`.
pub const RESERVED_WORDS: [ReservedWord; 20] = [
    ReservedWord::OpenParen,
    ReservedWord::CloseParen,
    ReservedWord::GreaterEqual,
    ReservedWord::LessEqual,
    ReservedWord::NotEqual,
    ReservedWord::Comma,
    ReservedWord::Equal,
    ReservedWord::Greater,
    ReservedWord::Less,
    ReservedWord::Select,
    ReservedWord::From,
    ReservedWord::Where,
    ReservedWord::Order,
    ReservedWord::By,
    ReservedWord::Asc,
    ReservedWord::Desc,
    ReservedWord::Limit,
    ReservedWord::Using,
    ReservedWord::Respond,
    ReservedWord::In,
];

/// Contextual keywords. Recognized by the parser in specific states but not
/// reserved, so they remain valid identifiers elsewhere.
pub const AND: &str = "AND";
pub const AS: &str = "AS";

impl ReservedWord {
    /// Canonical upper-case spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::NotEqual => "!=",
            Self::Comma => ",",
            Self::Equal => "=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Order => "ORDER",
            Self::By => "BY",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Limit => "LIMIT",
            Self::Using => "USING",
            Self::Respond => "RESPOND",
            Self::In => "IN",
        }
    }

    /// Byte width in the source text
    pub fn width(&self) -> usize {
        self.as_str().len()
    }

    /// Operators and delimiters, as opposed to alphabetic keywords
    pub fn is_punctuation(&self) -> bool {
        !self.as_str().as_bytes()[0].is_ascii_alphabetic()
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::GreaterEqual
                | Self::LessEqual
                | Self::NotEqual
                | Self::Equal
                | Self::Greater
                | Self::Less
        )
    }

    /// Case-insensitive lookup of a complete word
    pub fn from_str(s: &str) -> Option<Self> {
        RESERVED_WORDS
            .iter()
            .copied()
            .find(|word| word.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for ReservedWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn is_reserved_word(s: &str) -> bool {
    ReservedWord::from_str(s).is_some()
}

/// Characters a bare identifier token may contain
pub fn is_identifier_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'*'
}

/// A field, model zoo, data or mode name: word characters only and not a
/// reserved word. `*` is accepted separately, in SELECT field position only.
pub fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        && !is_reserved_word(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_char_operators_precede_prefixes() {
        let position = |word: ReservedWord| RESERVED_WORDS.iter().position(|w| *w == word);

        assert!(position(ReservedWord::GreaterEqual) < position(ReservedWord::Greater));
        assert!(position(ReservedWord::GreaterEqual) < position(ReservedWord::Equal));
        assert!(position(ReservedWord::LessEqual) < position(ReservedWord::Less));
        assert!(position(ReservedWord::NotEqual) < position(ReservedWord::Equal));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(ReservedWord::from_str("select"), Some(ReservedWord::Select));
        assert_eq!(ReservedWord::from_str("Respond"), Some(ReservedWord::Respond));
        assert_eq!(ReservedWord::from_str(">="), Some(ReservedWord::GreaterEqual));
        assert_eq!(ReservedWord::from_str("and"), None);
        assert_eq!(ReservedWord::from_str("AS"), None);
    }

    #[test]
    fn test_identifier_validity() {
        assert!(is_valid_identifier("n_param"));
        assert!(is_valid_identifier("and"));
        assert!(is_valid_identifier("index"));
        assert!(!is_valid_identifier("from"));
        assert!(!is_valid_identifier("*"));
        assert!(!is_valid_identifier("a*b"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_punctuation_classification() {
        assert!(ReservedWord::Comma.is_punctuation());
        assert!(ReservedWord::NotEqual.is_comparison());
        assert!(!ReservedWord::In.is_punctuation());
        assert!(!ReservedWord::Comma.is_comparison());
    }
}
