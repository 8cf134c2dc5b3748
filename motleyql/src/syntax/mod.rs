//! Query text to Plan
//!
//! [`parse`] handles one query; [`parse_many`] handles a sequence and stops
//! at the first failure, keeping the plans produced before it.

mod error;
mod parser;
mod report;

pub use error::{ErrorKind, ParseError, QueryError, SyntaxError, SyntaxResult};
pub use parser::{Parser, Step};
pub use report::Diagnostic;

use crate::config::runtime::ParserPreferences;
use crate::grammar::Plan;
use crate::logging::codes;
use crate::{log_debug, log_success};

/// Parse one query. Surrounding whitespace is ignored.
pub fn parse(text: &str) -> Result<Plan, ParseError> {
    parse_with_preferences(text, ParserPreferences::default())
}

pub fn parse_with_preferences(
    text: &str,
    preferences: ParserPreferences,
) -> Result<Plan, ParseError> {
    parse_at_line(text, 1, preferences)
}

/// Parse a query that sits on `line` of a query file
pub fn parse_at_line(
    text: &str,
    line: u32,
    preferences: ParserPreferences,
) -> Result<Plan, ParseError> {
    let plan = Parser::with_preferences(text.trim(), preferences)
        .with_line(line)
        .parse()?;

    log_debug!("Query parsed",
        "line" => line,
        "model_zoo" => plan.model_zoo,
        "conditions" => plan.conditions.len()
    );

    Ok(plan)
}

/// Outcome of [`parse_many`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedBatch {
    /// Plans in input order, up to the first failure
    pub plans: Vec<Plan>,
    pub error: Option<ParseError>,
}

impl ParsedBatch {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Index of the query that failed
    pub fn failed_index(&self) -> Option<usize> {
        self.error.as_ref().map(|_| self.plans.len())
    }

    pub fn into_result(self) -> Result<Vec<Plan>, ParseError> {
        match self.error {
            None => Ok(self.plans),
            Some(error) => Err(error),
        }
    }
}

/// Parse queries in order, stopping at the first failure
pub fn parse_many<I, S>(texts: I) -> ParsedBatch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_many_with_preferences(texts, ParserPreferences::default())
}

pub fn parse_many_with_preferences<I, S>(texts: I, preferences: ParserPreferences) -> ParsedBatch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_many_at_lines(texts.into_iter().map(|text| (1, text)), preferences)
}

/// [`parse_many`] over `(line, text)` pairs from a query file. Diagnostics
/// carry each query's own line.
pub fn parse_many_at_lines<I, S>(queries: I, preferences: ParserPreferences) -> ParsedBatch
where
    I: IntoIterator<Item = (u32, S)>,
    S: AsRef<str>,
{
    let mut batch = ParsedBatch::default();

    for (line, text) in queries {
        match parse_at_line(text.as_ref(), line, preferences.clone()) {
            Ok(plan) => batch.plans.push(plan),
            Err(error) => {
                batch.error = Some(error);
                return batch;
            }
        }
    }

    log_success!(
        codes::success::QUERIES_PARSED,
        "Queries parsed",
        "count" => batch.plans.len()
    );

    batch
}

/// Check that every parser error code has registry metadata
pub fn init_parser_logging() -> Result<(), String> {
    let parser_codes = [
        codes::lexical::UNTERMINATED_STRING,
        codes::lexical::UNEXPECTED_CHARACTER,
        codes::lexical::QUERY_TOO_LONG,
        codes::lexical::IDENTIFIER_TOO_LONG,
        codes::lexical::STRING_TOO_LONG,
        codes::syntax::INVALID_QUERY_TYPE,
        codes::syntax::UNEXPECTED_TOKEN,
        codes::syntax::UNEXPECTED_END_OF_INPUT,
        codes::syntax::INVALID_COUNT,
        codes::syntax::TRAILING_INPUT,
        codes::syntax::TOO_MANY_ITEMS,
        codes::semantic::EMPTY_WHERE_CLAUSE,
        codes::semantic::MISSING_QUERY_TYPE,
        codes::semantic::MISSING_MODEL_ZOO,
        codes::semantic::NEGATIVE_COUNT,
        codes::semantic::MISSING_OPERATOR,
        codes::semantic::EMPTY_LEFT_OPERAND,
        codes::semantic::EMPTY_RIGHT_OPERAND,
    ];

    for code in &parser_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Parser error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("Parser error codes validated", "count" => parser_codes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Condition, Operator, QueryType};
    use crate::validation::SemanticError;
    use assert_matches::assert_matches;

    const FULL_QUERY: &str = "SELECT * FROM models WHERE task = object_detection AND data_type = image \
                              ORDER BY n_param DESC LIMIT 1 USING local_data RESPOND IN fast_mode";

    #[test]
    fn test_minimal_query() {
        let plan = parse("SELECT * FROM models").unwrap();
        assert_eq!(plan.kind, QueryType::Select);
        assert_eq!(plan.fields, vec!["*"]);
        assert_eq!(plan.model_zoo, "models");
        assert_eq!(plan.count, 0);
        assert!(plan.conditions.is_empty());
        assert!(plan.order_by_items.is_empty());
        assert!(!plan.desc);
        assert!(plan.data.is_empty());
        assert!(plan.mode.is_empty());
    }

    #[test]
    fn test_where_with_and() {
        let plan =
            parse("SELECT * FROM models WHERE task = object_detection AND data_type = image")
                .unwrap();
        assert_eq!(
            plan.conditions,
            vec![
                Condition::field("task", Operator::Eq, "object_detection"),
                Condition::field("data_type", Operator::Eq, "image"),
            ]
        );
    }

    #[test]
    fn test_full_query() {
        let plan = parse(FULL_QUERY).unwrap();
        assert_eq!(plan.conditions.len(), 2);
        assert_eq!(plan.order_by_items, vec!["n_param"]);
        assert!(plan.desc);
        assert_eq!(plan.count, 1);
        assert_eq!(plan.data, "local_data");
        assert_eq!(plan.mode, "fast_mode");
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse(FULL_QUERY).unwrap(), parse(FULL_QUERY).unwrap());
    }

    #[test]
    fn test_display_reparses_to_same_plan() {
        let plan = parse("SELECT a, b FROM models WHERE x > '5' ORDER BY a LIMIT 4").unwrap();
        assert_eq!(parse(&plan.to_string()).unwrap(), plan);
    }

    #[test]
    fn test_display_quotes_model_zoo_when_needed() {
        for query in ["SELECT * FROM 'public zoo'", "SELECT * FROM 'where' LIMIT 2"] {
            let plan = parse(query).unwrap();
            let text = plan.to_string();
            assert_eq!(text, query);
            assert_eq!(parse(&text).unwrap(), plan);
        }

        let plan = parse("SELECT * FROM 'models'").unwrap();
        assert_eq!(plan.to_string(), "SELECT * FROM models");
    }

    #[test]
    fn test_empty_where_clause() {
        let error = parse("SELECT * FROM models WHERE").unwrap_err();
        assert_eq!(error.error, QueryError::Semantic(SemanticError::EmptyWhereClause));
        assert_eq!(error.kind(), ErrorKind::Semantic);
        assert_eq!(error.to_string(), "at WHERE: empty WHERE clause");
    }

    #[test]
    fn test_limit_zero() {
        let error = parse("SELECT * FROM models LIMIT 0").unwrap_err();
        assert_matches!(
            error.error,
            QueryError::Syntax(SyntaxError::InvalidCount { offset: 27, .. })
        );
        assert!(error.to_string().contains("count must be a positive integer"));
    }

    #[test]
    fn test_quoted_value_is_literal() {
        let plan = parse("SELECT a, b FROM models WHERE x > '5'").unwrap();
        assert_eq!(plan.fields, vec!["a", "b"]);
        assert_eq!(plan.conditions[0].operator, Operator::Gt);
        assert_eq!(plan.conditions[0].operand2, "5");
        assert!(!plan.conditions[0].operand2_is_field);
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let plan = parse("select a from models where x <= y and z != 'q' order by a asc").unwrap();
        assert_eq!(plan.conditions[0].operator, Operator::Lte);
        assert_eq!(plan.conditions[1].operator, Operator::Ne);
        assert!(!plan.desc);
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let plan = parse("  \tSELECT * FROM models \n").unwrap();
        assert_eq!(plan.model_zoo, "models");
    }

    #[test]
    fn test_invalid_query_type() {
        let error = parse("UPDATE models").unwrap_err();
        assert_matches!(
            error.error,
            QueryError::Syntax(SyntaxError::InvalidQueryType { offset: 0, .. })
        );
        assert_eq!(error.position, 0);
    }

    #[test]
    fn test_empty_query_has_no_type() {
        let error = parse("   ").unwrap_err();
        assert_eq!(error.error, QueryError::Semantic(SemanticError::MissingQueryType));
    }

    #[test]
    fn test_partial_plan_is_returned() {
        let error = parse("SELECT a, b FROM models WHERE x = y AND").unwrap_err();
        assert_eq!(error.partial.fields, vec!["a", "b"]);
        assert_eq!(error.partial.conditions.len(), 1);
    }

    #[test]
    fn test_diagnostic_points_at_failure() {
        let error = parse("SELECT * FROM models LIMIT 0").unwrap_err();
        let rendered = error.render_diagnostic();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "SELECT * FROM models LIMIT 0");
        assert_eq!(lines[1], format!("{}^", " ".repeat(27)));
        assert_eq!(lines[2], error.to_string());
    }

    #[test]
    fn test_parse_many_stops_at_first_failure() {
        let batch = parse_many([
            "SELECT * FROM models",
            "SELECT * FROM models WHERE",
            "SELECT * FROM zoo",
        ]);

        assert_eq!(batch.plans.len(), 1);
        assert_eq!(batch.failed_index(), Some(1));
        assert!(!batch.is_complete());
        assert_matches!(
            batch.error,
            Some(ParseError {
                error: QueryError::Semantic(SemanticError::EmptyWhereClause),
                ..
            })
        );
    }

    #[test]
    fn test_parse_many_all_valid() {
        let queries = vec![String::from("SELECT * FROM a"), String::from("SELECT x FROM b")];
        let plans = parse_many(&queries).into_result().unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[1].model_zoo, "b");

        let empty = parse_many(Vec::<String>::new());
        assert!(empty.is_complete());
        assert!(empty.plans.is_empty());
    }

    #[test]
    fn test_parse_many_at_lines_keeps_order() {
        let batch = parse_many_at_lines(
            [(3, "SELECT * FROM a"), (7, "SELECT b"), (9, "SELECT * FROM c")],
            ParserPreferences::default(),
        );
        assert_eq!(batch.plans.len(), 1);
        assert_eq!(batch.failed_index(), Some(1));
        assert_eq!(
            batch.error.map(|e| e.error),
            Some(QueryError::Semantic(SemanticError::MissingModelZoo))
        );
    }

    #[test]
    fn test_parser_codes_registered() {
        assert!(init_parser_logging().is_ok());
    }
}
