//! Semantic validation of parsed plans
//!
//! Runs once after the state loop finishes without a lexical or syntax error.
//! The same plan-level checks are available to callers holding a Plan from
//! elsewhere (for example one loaded from JSON) through [`Plan::validate`].
//!
//! [`Plan::validate`]: crate::grammar::Plan::validate

use crate::grammar::{Operator, Plan, QueryType};
use crate::logging::codes::{self, Code, Severity};
use thiserror::Error;

pub type SemanticResult<T> = Result<T, SemanticError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("at WHERE: empty WHERE clause")]
    EmptyWhereClause,

    #[error("query type cannot be empty")]
    MissingQueryType,

    #[error("model zoo name cannot be empty")]
    MissingModelZoo,

    #[error("count cannot be negative (found {count})")]
    NegativeCount { count: i64 },

    #[error("at WHERE: condition {index} without operator")]
    MissingOperator { index: usize },

    #[error("at WHERE: condition {index} with empty left side operand")]
    EmptyLeftOperand { index: usize },

    #[error("at WHERE: condition {index} with empty right side operand")]
    EmptyRightOperand { index: usize },
}

impl SemanticError {
    pub fn error_code(&self) -> Code {
        match self {
            SemanticError::EmptyWhereClause => codes::semantic::EMPTY_WHERE_CLAUSE,
            SemanticError::MissingQueryType => codes::semantic::MISSING_QUERY_TYPE,
            SemanticError::MissingModelZoo => codes::semantic::MISSING_MODEL_ZOO,
            SemanticError::NegativeCount { .. } => codes::semantic::NEGATIVE_COUNT,
            SemanticError::MissingOperator { .. } => codes::semantic::MISSING_OPERATOR,
            SemanticError::EmptyLeftOperand { .. } => codes::semantic::EMPTY_LEFT_OPERAND,
            SemanticError::EmptyRightOperand { .. } => codes::semantic::EMPTY_RIGHT_OPERAND,
        }
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}

/// Checks run at the end of a parse. `awaiting_where_field` is true when the
/// machine stopped right after the WHERE keyword.
pub fn validate_parsed(plan: &Plan, awaiting_where_field: bool) -> SemanticResult<()> {
    if awaiting_where_field && plan.conditions.is_empty() {
        return Err(SemanticError::EmptyWhereClause);
    }
    validate_plan(plan)
}

/// Well-formedness of a complete plan
pub fn validate_plan(plan: &Plan) -> SemanticResult<()> {
    if plan.kind == QueryType::Unknown {
        return Err(SemanticError::MissingQueryType);
    }
    if plan.model_zoo.is_empty() {
        return Err(SemanticError::MissingModelZoo);
    }
    for (index, condition) in plan.conditions.iter().enumerate() {
        if condition.operator == Operator::Unknown {
            return Err(SemanticError::MissingOperator { index });
        }
        if condition.operand1_is_field && condition.operand1.is_empty() {
            return Err(SemanticError::EmptyLeftOperand { index });
        }
        if condition.operand2_is_field && condition.operand2.is_empty() {
            return Err(SemanticError::EmptyRightOperand { index });
        }
    }

    if plan.count < 0 {
        return Err(SemanticError::NegativeCount { count: plan.count });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Condition;
    use assert_matches::assert_matches;

    fn minimal_plan() -> Plan {
        Plan {
            kind: QueryType::Select,
            fields: vec!["*".into()],
            model_zoo: "models".into(),
            ..Plan::default()
        }
    }

    #[test]
    fn test_minimal_plan_is_valid() {
        assert!(validate_plan(&minimal_plan()).is_ok());
        assert!(validate_parsed(&minimal_plan(), false).is_ok());
    }

    #[test]
    fn test_where_without_conditions() {
        assert_eq!(
            validate_parsed(&minimal_plan(), true),
            Err(SemanticError::EmptyWhereClause)
        );
    }

    #[test]
    fn test_missing_type_and_zoo() {
        let mut plan = minimal_plan();
        plan.kind = QueryType::Unknown;
        assert_eq!(validate_plan(&plan), Err(SemanticError::MissingQueryType));

        let mut plan = minimal_plan();
        plan.model_zoo.clear();
        assert_eq!(validate_plan(&plan), Err(SemanticError::MissingModelZoo));
    }

    #[test]
    fn test_negative_count() {
        let mut plan = minimal_plan();
        plan.count = -2;
        assert_matches!(
            validate_plan(&plan),
            Err(SemanticError::NegativeCount { count: -2 })
        );
    }

    #[test]
    fn test_condition_checks() {
        let mut plan = minimal_plan();
        plan.conditions = vec![
            Condition::field("task", Operator::Eq, "detection"),
            Condition {
                operand1: "a".into(),
                operand1_is_field: true,
                ..Condition::default()
            },
        ];
        assert_eq!(
            validate_plan(&plan),
            Err(SemanticError::MissingOperator { index: 1 })
        );

        plan.conditions = vec![Condition::field("", Operator::Gt, "b")];
        assert_eq!(
            validate_plan(&plan),
            Err(SemanticError::EmptyLeftOperand { index: 0 })
        );

        plan.conditions = vec![Condition::field("a", Operator::Gt, "")];
        assert_eq!(
            validate_plan(&plan),
            Err(SemanticError::EmptyRightOperand { index: 0 })
        );
    }

    #[test]
    fn test_empty_literal_is_allowed() {
        let mut plan = minimal_plan();
        plan.conditions = vec![Condition::literal("name", Operator::Ne, "")];
        assert!(validate_plan(&plan).is_ok());
    }

    #[test]
    fn test_codes_are_semantic() {
        let error = SemanticError::NegativeCount { count: -1 };
        assert_eq!(error.error_code(), codes::semantic::NEGATIVE_COUNT);
        assert_eq!(error.category(), "Semantic");
        assert!(!codes::requires_halt(error.error_code().as_str()));
    }
}
