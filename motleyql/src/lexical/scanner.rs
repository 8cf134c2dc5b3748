//! Token recognition at a cursor
//!
//! Recognition order: end of input, reserved words in table order, quoted
//! literals, then bare words. Peeking never mutates anything; the parser
//! owns the cursor.

use super::LexerError;
use crate::config::compile_time::lexical::{MAX_IDENTIFIER_LENGTH, MAX_STRING_LITERAL_LENGTH};
use crate::grammar::keywords::{is_identifier_char, ReservedWord, RESERVED_WORDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexemeKind {
    End,
    Reserved(ReservedWord),
    /// Content of a `'...'` literal, quotes stripped
    Quoted,
    /// Run of `[A-Za-z0-9_*]` that is not a reserved word
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub kind: LexemeKind,
    pub text: &'a str,
    /// Bytes consumed from the source, quotes included
    pub width: usize,
}

impl<'a> Lexeme<'a> {
    fn end() -> Self {
        Self {
            kind: LexemeKind::End,
            text: "",
            width: 0,
        }
    }

    pub fn is_end(&self) -> bool {
        self.kind == LexemeKind::End
    }

    pub fn is_reserved(&self, word: ReservedWord) -> bool {
        self.kind == LexemeKind::Reserved(word)
    }

    /// Bare word matching `keyword` case-insensitively (contextual keywords)
    pub fn is_word(&self, keyword: &str) -> bool {
        self.kind == LexemeKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn reserved(&self) -> Option<ReservedWord> {
        match self.kind {
            LexemeKind::Reserved(word) => Some(word),
            _ => None,
        }
    }

    /// Text for messages: reserved words in canonical spelling, literals quoted
    pub fn describe(&self) -> String {
        match self.kind {
            LexemeKind::End => "end of input".to_string(),
            LexemeKind::Reserved(word) => format!("'{}'", word),
            LexemeKind::Quoted => format!("'{}'", self.text),
            LexemeKind::Word => format!("'{}'", self.text),
        }
    }
}

/// Borrowing view over one query
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    source: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn is_at_end(&self, cursor: usize) -> bool {
        cursor >= self.source.len()
    }

    /// Token starting at `cursor`, without advancing
    pub fn peek_at(&self, cursor: usize) -> Result<Lexeme<'a>, LexerError> {
        let rest = self.source.get(cursor..).unwrap_or("");
        scan(rest, cursor)
    }

    /// Cursor after `lexeme` and the run of spaces that follows it
    pub fn advance(&self, cursor: usize, lexeme: &Lexeme<'_>) -> usize {
        self.skip_spaces(cursor + lexeme.width)
    }

    /// Skips ASCII spaces only. Tabs and newlines are not separators.
    pub fn skip_spaces(&self, cursor: usize) -> usize {
        let bytes = self.source.as_bytes();
        let mut next = cursor;
        while next < bytes.len() && bytes[next] == b' ' {
            next += 1;
        }
        next
    }
}

/// Token at the start of `input`
pub fn peek(input: &str) -> Result<Lexeme<'_>, LexerError> {
    scan(input, 0)
}

fn scan(rest: &str, offset: usize) -> Result<Lexeme<'_>, LexerError> {
    if rest.is_empty() {
        return Ok(Lexeme::end());
    }

    if let Some(word) = match_reserved(rest) {
        return Ok(Lexeme {
            kind: LexemeKind::Reserved(word),
            text: &rest[..word.width()],
            width: word.width(),
        });
    }

    if rest.starts_with('\'') {
        return scan_quoted(rest, offset);
    }

    scan_word(rest, offset)
}

/// First table entry that prefixes `rest`. Alphabetic words must end at an
/// identifier boundary.
fn match_reserved(rest: &str) -> Option<ReservedWord> {
    let bytes = rest.as_bytes();

    RESERVED_WORDS.iter().copied().find(|word| {
        let width = word.width();
        let Some(prefix) = bytes.get(..width) else {
            return false;
        };
        if !prefix.eq_ignore_ascii_case(word.as_str().as_bytes()) {
            return false;
        }
        word.is_punctuation()
            || bytes
                .get(width)
                .map_or(true, |next| !is_identifier_char(*next))
    })
}

fn scan_quoted(rest: &str, offset: usize) -> Result<Lexeme<'_>, LexerError> {
    let bytes = rest.as_bytes();
    let closing = (1..bytes.len()).find(|&i| bytes[i] == b'\'' && bytes[i - 1] != b'\\');

    let Some(closing) = closing else {
        return Err(LexerError::UnterminatedString { offset });
    };

    let content = &rest[1..closing];
    if content.len() > MAX_STRING_LITERAL_LENGTH {
        return Err(LexerError::StringTooLong {
            length: content.len(),
            offset,
        });
    }

    Ok(Lexeme {
        kind: LexemeKind::Quoted,
        text: content,
        width: closing + 1,
    })
}

fn scan_word(rest: &str, offset: usize) -> Result<Lexeme<'_>, LexerError> {
    let width = rest
        .bytes()
        .position(|b| !is_identifier_char(b))
        .unwrap_or(rest.len());

    if width == 0 {
        let character = rest.chars().next().unwrap_or('\0');
        return Err(LexerError::UnexpectedCharacter { character, offset });
    }

    if width > MAX_IDENTIFIER_LENGTH {
        return Err(LexerError::IdentifierTooLong {
            length: width,
            offset,
        });
    }

    Ok(Lexeme {
        kind: LexemeKind::Word,
        text: &rest[..width],
        width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_peek_prefers_longest_operator() {
        let lexeme = peek(">= 5").unwrap();
        assert_eq!(lexeme.kind, LexemeKind::Reserved(ReservedWord::GreaterEqual));
        assert_eq!(lexeme.text, ">=");
        assert_eq!(lexeme.width, 2);

        assert!(peek("!=x").unwrap().is_reserved(ReservedWord::NotEqual));
        assert!(peek("<5").unwrap().is_reserved(ReservedWord::Less));
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let lexeme = peek("select * from models").unwrap();
        assert!(lexeme.is_reserved(ReservedWord::Select));
        assert_eq!(lexeme.text, "select");
        assert_eq!(lexeme.width, 6);
    }

    #[test]
    fn test_keyword_prefix_is_an_identifier() {
        let lexeme = peek("index = 1").unwrap();
        assert_eq!(lexeme.kind, LexemeKind::Word);
        assert_eq!(lexeme.text, "index");

        assert_eq!(peek("ordering").unwrap().kind, LexemeKind::Word);
        assert_eq!(peek("by_task").unwrap().kind, LexemeKind::Word);
    }

    #[test]
    fn test_punctuation_needs_no_boundary() {
        let lexeme = peek(",b").unwrap();
        assert!(lexeme.is_reserved(ReservedWord::Comma));
        assert!(peek("=image").unwrap().is_reserved(ReservedWord::Equal));
    }

    #[test]
    fn test_quoted_literal() {
        let lexeme = peek("'5' AND").unwrap();
        assert_eq!(lexeme.kind, LexemeKind::Quoted);
        assert_eq!(lexeme.text, "5");
        assert_eq!(lexeme.width, 3);

        let empty = peek("''").unwrap();
        assert_eq!(empty.text, "");
        assert_eq!(empty.width, 2);
    }

    #[test]
    fn test_escaped_quote_does_not_terminate() {
        let lexeme = peek(r"'it\'s' x").unwrap();
        assert_eq!(lexeme.text, r"it\'s");
        assert_eq!(lexeme.width, 7);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_matches!(
            Scanner::new("x = 'open").peek_at(4),
            Err(LexerError::UnterminatedString { offset: 4 })
        );
    }

    #[test]
    fn test_asterisk_is_a_word() {
        let lexeme = peek("* FROM models").unwrap();
        assert_eq!(lexeme.kind, LexemeKind::Word);
        assert_eq!(lexeme.text, "*");
    }

    #[test]
    fn test_unexpected_character() {
        assert_matches!(
            peek("#models"),
            Err(LexerError::UnexpectedCharacter {
                character: '#',
                offset: 0
            })
        );
        assert_matches!(
            peek("é"),
            Err(LexerError::UnexpectedCharacter { character: 'é', .. })
        );
    }

    #[test]
    fn test_identifier_length_ceiling() {
        let long = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert_matches!(peek(&long), Err(LexerError::IdentifierTooLong { .. }));
    }

    #[test]
    fn test_end_of_input() {
        let scanner = Scanner::new("models");
        let lexeme = scanner.peek_at(6).unwrap();
        assert!(lexeme.is_end());
        assert_eq!(lexeme.width, 0);
        assert!(scanner.is_at_end(6));
    }

    #[test]
    fn test_advance_skips_spaces_only() {
        let scanner = Scanner::new("SELECT   a,\tb");
        let select = scanner.peek_at(0).unwrap();
        let cursor = scanner.advance(0, &select);
        assert_eq!(cursor, 9);

        let field = scanner.peek_at(cursor).unwrap();
        assert_eq!(field.text, "a");
        let comma_at = scanner.advance(cursor, &field);
        let comma = scanner.peek_at(comma_at).unwrap();
        let after_comma = scanner.advance(comma_at, &comma);
        assert_matches!(
            scanner.peek_at(after_comma),
            Err(LexerError::UnexpectedCharacter {
                character: '\t',
                ..
            })
        );
    }

    #[test]
    fn test_peek_does_not_advance() {
        let scanner = Scanner::new("FROM models");
        assert_eq!(scanner.peek_at(0).unwrap(), scanner.peek_at(0).unwrap());
    }

    #[test]
    fn test_contextual_keywords() {
        assert!(peek("and x").unwrap().is_word("AND"));
        assert!(peek("As y").unwrap().is_word("as"));
        assert!(!peek("'and'").unwrap().is_word("AND"));
    }
}
