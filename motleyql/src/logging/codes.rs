//! Error and success codes with their classification metadata
//!
//! Every code the parser, file processor and batch runner can emit is listed
//! here together with its category, severity and recommended action.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_QUERIES: Code = Code::new("E013");
}

/// Malformed tokens
pub mod lexical {
    use super::Code;

    pub const UNTERMINATED_STRING: Code = Code::new("E020");
    pub const UNEXPECTED_CHARACTER: Code = Code::new("E021");
    pub const QUERY_TOO_LONG: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LONG: Code = Code::new("E024");
}

/// Wrong token for the current grammar state
pub mod syntax {
    use super::Code;

    pub const INVALID_QUERY_TYPE: Code = Code::new("E040");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E041");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E042");
    pub const INVALID_COUNT: Code = Code::new("E043");
    pub const TRAILING_INPUT: Code = Code::new("E044");
    pub const TOO_MANY_ITEMS: Code = Code::new("E045");
}

/// Plan validation failures
pub mod semantic {
    use super::Code;

    pub const EMPTY_WHERE_CLAUSE: Code = Code::new("E060");
    pub const MISSING_QUERY_TYPE: Code = Code::new("E061");
    pub const MISSING_MODEL_ZOO: Code = Code::new("E062");
    pub const NEGATIVE_COUNT: Code = Code::new("E063");
    pub const MISSING_OPERATOR: Code = Code::new("E064");
    pub const EMPTY_LEFT_OPERAND: Code = Code::new("E065");
    pub const EMPTY_RIGHT_OPERAND: Code = Code::new("E066");
}

pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("E080");
    pub const DISCOVERY_FAILED: Code = Code::new("E081");
    pub const TOO_MANY_FILES: Code = Code::new("E082");
    pub const WORKER_FAILED: Code = Code::new("E083");
}

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const QUERY_PARSED: Code = Code::new("I010");
    pub const QUERIES_PARSED: Code = Code::new("I011");
    pub const PIPELINE_COMPLETE: Code = Code::new("I012");
    pub const BATCH_COMPLETE: Code = Code::new("I020");
    pub const PLAN_EXECUTED: Code = Code::new("I030");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const ERROR_TABLE: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal error",
        "File a bug report with the failing input",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "Initialization failure",
        "Check configuration files and MOTLEY_* environment variables",
    ),
    // File processing
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Query file not found",
        "Verify the file path exists and is accessible",
    ),
    ErrorMetadata::new(
        "E006",
        "FileProcessing",
        Severity::Medium,
        true,
        false,
        "Invalid file extension",
        "Rename the file with a .mql extension",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "File exceeds maximum size",
        "Split the query file into smaller files",
    ),
    ErrorMetadata::new(
        "E008",
        "FileProcessing",
        Severity::Medium,
        true,
        false,
        "Query file is empty",
        "Add at least one query to the file",
    ),
    ErrorMetadata::new(
        "E009",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Permission denied",
        "Check file permissions",
    ),
    ErrorMetadata::new(
        "E010",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Invalid UTF-8 encoding",
        "Save the query file as UTF-8",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "I/O error while reading file",
        "Check disk and filesystem health",
    ),
    ErrorMetadata::new(
        "E012",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Invalid file path",
        "Provide a path to a regular file",
    ),
    ErrorMetadata::new(
        "E013",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "File contains too many queries",
        "Split the query file into smaller files",
    ),
    // Lexical
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::High,
        false,
        false,
        "Unterminated string literal",
        "Close the literal with a single quote",
    ),
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::High,
        false,
        false,
        "Character not allowed in a query",
        "Use letters, digits, underscores, operators or quoted literals",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::High,
        false,
        false,
        "Query exceeds maximum length",
        "Shorten the query",
    ),
    ErrorMetadata::new(
        "E023",
        "Lexical",
        Severity::Medium,
        false,
        false,
        "Identifier exceeds maximum length",
        "Use a shorter field or model zoo name",
    ),
    ErrorMetadata::new(
        "E024",
        "Lexical",
        Severity::Medium,
        false,
        false,
        "String literal exceeds maximum length",
        "Use a shorter quoted value",
    ),
    // Syntax
    ErrorMetadata::new(
        "E040",
        "Syntax",
        Severity::High,
        false,
        false,
        "Query does not start with a supported query type",
        "Start the query with SELECT",
    ),
    ErrorMetadata::new(
        "E041",
        "Syntax",
        Severity::High,
        false,
        false,
        "Unexpected token",
        "Check the clause order: SELECT, FROM, WHERE, ORDER BY, LIMIT, USING, RESPOND IN",
    ),
    ErrorMetadata::new(
        "E042",
        "Syntax",
        Severity::High,
        false,
        false,
        "Query ends in the middle of a clause",
        "Complete the last clause of the query",
    ),
    ErrorMetadata::new(
        "E043",
        "Syntax",
        Severity::Medium,
        false,
        false,
        "LIMIT count is not a positive integer",
        "Use a whole number greater than zero after LIMIT",
    ),
    ErrorMetadata::new(
        "E044",
        "Syntax",
        Severity::Medium,
        false,
        false,
        "Input after the end of the query",
        "Remove trailing tokens or put each query on its own line",
    ),
    ErrorMetadata::new(
        "E045",
        "Syntax",
        Severity::Medium,
        false,
        false,
        "Clause has too many items",
        "Reduce the number of fields, conditions or order keys",
    ),
    // Semantic
    ErrorMetadata::new(
        "E060",
        "Semantic",
        Severity::Medium,
        false,
        false,
        "WHERE clause without conditions",
        "Add a condition after WHERE or remove the keyword",
    ),
    ErrorMetadata::new(
        "E061",
        "Semantic",
        Severity::High,
        false,
        false,
        "Query type is missing",
        "Start the query with SELECT",
    ),
    ErrorMetadata::new(
        "E062",
        "Semantic",
        Severity::High,
        false,
        false,
        "Model zoo name is missing",
        "Name the model zoo after FROM",
    ),
    ErrorMetadata::new(
        "E063",
        "Semantic",
        Severity::Medium,
        false,
        false,
        "Negative result count",
        "Use a positive LIMIT",
    ),
    ErrorMetadata::new(
        "E064",
        "Semantic",
        Severity::Medium,
        false,
        false,
        "Condition without operator",
        "Compare the field with =, !=, >, <, >= or <=",
    ),
    ErrorMetadata::new(
        "E065",
        "Semantic",
        Severity::Medium,
        false,
        false,
        "Condition with empty left operand",
        "Name a field on the left side of the comparison",
    ),
    ErrorMetadata::new(
        "E066",
        "Semantic",
        Severity::Medium,
        false,
        false,
        "Condition with empty right operand",
        "Name a field or quote a value on the right side",
    ),
    // Batch
    ErrorMetadata::new(
        "E080",
        "Batch",
        Severity::High,
        false,
        true,
        "Batch directory not found",
        "Verify the directory path",
    ),
    ErrorMetadata::new(
        "E081",
        "Batch",
        Severity::High,
        false,
        true,
        "Query file discovery failed",
        "Check directory permissions",
    ),
    ErrorMetadata::new(
        "E082",
        "Batch",
        Severity::High,
        false,
        true,
        "Too many files in batch",
        "Process the directory in smaller batches",
    ),
    ErrorMetadata::new(
        "E083",
        "Batch",
        Severity::Critical,
        false,
        true,
        "Batch worker failed",
        "Re-run sequentially to isolate the failing file",
    ),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        ERROR_TABLE
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_no_duplicates() {
        assert_eq!(get_error_registry().len(), ERROR_TABLE.len());
    }

    #[test]
    fn test_stage_codes_have_metadata() {
        let stage_codes = [
            lexical::UNTERMINATED_STRING,
            lexical::UNEXPECTED_CHARACTER,
            syntax::INVALID_QUERY_TYPE,
            syntax::UNEXPECTED_END_OF_INPUT,
            semantic::EMPTY_WHERE_CLAUSE,
            semantic::EMPTY_RIGHT_OPERAND,
            batch::WORKER_FAILED,
        ];

        for code in stage_codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification_lookups() {
        assert_eq!(get_category("E041"), "Syntax");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("E005"));
        assert!(!requires_halt("E060"));
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("I010"), "Unknown");
    }
}
