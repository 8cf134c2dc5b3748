//! Query parser state machine
//!
//! The parser owns a cursor into the trimmed query and moves strictly
//! forward through [`Step`]s. Each step peeks the token at the cursor,
//! records what it needs in the plan, pops the token and picks the next
//! step. There is no backtracking: the first token a step cannot accept
//! ends the parse with an error.

use super::error::{ParseError, QueryError, SyntaxError};
use crate::config::compile_time::syntax::{MAX_CONDITIONS, MAX_ORDER_BY_ITEMS, MAX_SELECT_FIELDS};
use crate::config::runtime::ParserPreferences;
use crate::grammar::keywords::{is_valid_identifier, ReservedWord, AND, AS};
use crate::grammar::{Condition, Operator, Plan, QueryType};
use crate::lexical::{self, Lexeme, LexemeKind, Scanner};
use crate::validation;
use crate::{log_debug, log_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Type,
    SelectField,
    SelectComma,
    SelectFrom,
    SelectFromModelZoo,
    Where,
    WhereField,
    WhereOperator,
    WhereValue,
    WhereAnd,
    Order,
    By,
    OrderByField,
    Limit,
    Count,
    Using,
    Data,
    Respond,
    In,
    Mode,
    Done,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Type => "Type",
            Step::SelectField => "SelectField",
            Step::SelectComma => "SelectComma",
            Step::SelectFrom => "SelectFrom",
            Step::SelectFromModelZoo => "SelectFromModelZoo",
            Step::Where => "Where",
            Step::WhereField => "WhereField",
            Step::WhereOperator => "WhereOperator",
            Step::WhereValue => "WhereValue",
            Step::WhereAnd => "WhereAnd",
            Step::Order => "Order",
            Step::By => "By",
            Step::OrderByField => "OrderByField",
            Step::Limit => "Limit",
            Step::Count => "Count",
            Step::Using => "Using",
            Step::Data => "Data",
            Step::Respond => "Respond",
            Step::In => "In",
            Step::Mode => "Mode",
            Step::Done => "Done",
        }
    }

    /// Steps where the query may stop: every remaining clause is optional
    pub fn accepts_end(&self) -> bool {
        matches!(
            self,
            Step::Where | Step::WhereAnd | Step::Limit | Step::Using | Step::Respond | Step::Done
        )
    }

    /// What the step was waiting for, for end-of-input errors
    pub fn expected(&self) -> &'static str {
        match self {
            Step::Type => "SELECT",
            Step::SelectField | Step::WhereField | Step::OrderByField => "field",
            Step::SelectComma => "comma or FROM",
            Step::SelectFrom => "FROM",
            Step::SelectFromModelZoo => "model zoo name",
            Step::Where => "WHERE",
            Step::WhereOperator => "comparison operator",
            Step::WhereValue => "field or quoted value",
            Step::WhereAnd => "AND",
            Step::Order => "ORDER",
            Step::By => "BY",
            Step::Limit => "LIMIT",
            Step::Count => "count",
            Step::Using => "USING",
            Step::Data => "data",
            Step::Respond => "RESPOND",
            Step::In => "IN",
            Step::Mode => "mode",
            Step::Done => "end of input",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

type StepResult = Result<(), QueryError>;

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    cursor: usize,
    step: Step,
    plan: Plan,
    preferences: ParserPreferences,
    /// Line of the enclosing file, for logged spans
    line: u32,
}

impl<'a> Parser<'a> {
    /// Parser over `query`, which must already be trimmed
    pub fn new(query: &'a str) -> Self {
        Self::with_preferences(query, ParserPreferences::default())
    }

    pub fn with_preferences(query: &'a str, preferences: ParserPreferences) -> Self {
        Self {
            scanner: Scanner::new(query),
            cursor: 0,
            step: Step::Type,
            plan: Plan::default(),
            preferences,
            line: 1,
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Run the machine to the end of input, then validate
    pub fn parse(mut self) -> Result<Plan, ParseError> {
        match self.run() {
            Ok(()) => Ok(self.plan),
            Err(error) => Err(self.fail(error)),
        }
    }

    fn run(&mut self) -> StepResult {
        lexical::check_query_length(self.scanner.source())?;

        loop {
            let lexeme = self.scanner.peek_at(self.cursor)?;
            if lexeme.is_end() {
                break;
            }
            self.advance_step(lexeme)?;
        }

        validation::validate_parsed(&self.plan, self.step == Step::WhereField)?;

        if !self.step.accepts_end() {
            return Err(SyntaxError::UnexpectedEndOfInput {
                expected: self.step.expected(),
            }
            .into());
        }

        Ok(())
    }

    fn advance_step(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        match self.step {
            Step::Type => self.step_type(lexeme),
            Step::SelectField => self.step_select_field(lexeme),
            Step::SelectComma => self.step_select_comma(lexeme),
            Step::SelectFrom => self.step_select_from(lexeme),
            Step::SelectFromModelZoo => self.step_model_zoo(lexeme),
            Step::Where => self.step_where(lexeme),
            Step::WhereField => self.step_where_field(lexeme),
            Step::WhereOperator => self.step_where_operator(lexeme),
            Step::WhereValue => self.step_where_value(lexeme),
            Step::WhereAnd => self.step_where_and(lexeme),
            Step::Order => self.expect_keyword(lexeme, ReservedWord::Order, Step::By),
            Step::By => self.expect_keyword(lexeme, ReservedWord::By, Step::OrderByField),
            Step::OrderByField => self.step_order_by_field(lexeme),
            Step::Limit => self.step_limit(lexeme),
            Step::Count => self.step_count(lexeme),
            Step::Using => self.step_using(lexeme),
            Step::Data => self.step_data(lexeme),
            Step::Respond => self.expect_keyword(lexeme, ReservedWord::Respond, Step::In),
            Step::In => self.expect_keyword(lexeme, ReservedWord::In, Step::Mode),
            Step::Mode => self.step_mode(lexeme),
            Step::Done => Err(SyntaxError::TrailingInput {
                found: lexeme.describe(),
                offset: self.cursor,
            }
            .into()),
        }
    }

    // ========================================================================
    // SELECT ... FROM
    // ========================================================================

    fn step_type(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        if !lexeme.is_reserved(ReservedWord::Select) {
            return Err(SyntaxError::InvalidQueryType {
                found: lexeme.describe(),
                offset: self.cursor,
            }
            .into());
        }
        self.plan.kind = QueryType::Select;
        self.pop(&lexeme);
        self.goto(Step::SelectField);
        Ok(())
    }

    fn step_select_field(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        if !is_field_or_asterisk(&lexeme) {
            return Err(self.unexpected("SELECT", "field", &lexeme));
        }
        if self.plan.fields.len() >= MAX_SELECT_FIELDS {
            return Err(self.too_many("SELECT", MAX_SELECT_FIELDS));
        }
        self.plan.fields.push(lexeme.text.to_string());
        self.pop(&lexeme);

        // `field AS alias`: the alias is checked and dropped
        let next = self.scanner.peek_at(self.cursor)?;
        if next.is_word(AS) {
            self.pop(&next);
            let alias = self.scanner.peek_at(self.cursor)?;
            if !is_identifier(&alias) {
                return Err(self.unexpected("SELECT", "field alias", &alias));
            }
            self.pop(&alias);
        }

        self.goto(Step::SelectComma);
        Ok(())
    }

    fn step_select_comma(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        match lexeme.reserved() {
            Some(ReservedWord::Comma) => {
                self.pop(&lexeme);
                self.goto(Step::SelectField);
                Ok(())
            }
            Some(ReservedWord::From) => {
                self.goto(Step::SelectFrom);
                Ok(())
            }
            _ => Err(self.unexpected("SELECT", "comma or FROM", &lexeme)),
        }
    }

    fn step_select_from(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        if !lexeme.is_reserved(ReservedWord::From) {
            return Err(self.unexpected("SELECT", "FROM", &lexeme));
        }
        self.pop(&lexeme);
        self.goto(Step::SelectFromModelZoo);
        Ok(())
    }

    fn step_model_zoo(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        let named = match lexeme.kind {
            LexemeKind::Quoted => !lexeme.text.is_empty(),
            _ => is_identifier(&lexeme),
        };
        if !named {
            return Err(self.unexpected("SELECT", "model zoo name", &lexeme));
        }
        self.plan.model_zoo = lexeme.text.to_string();
        self.pop(&lexeme);
        self.goto(Step::Where);
        Ok(())
    }

    // ========================================================================
    // WHERE
    // ========================================================================

    /// Entry after the model zoo. WHERE is the default; any later optional
    /// clause may start here instead.
    fn step_where(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        match lexeme.reserved() {
            Some(ReservedWord::Where) => {
                self.pop(&lexeme);
                self.goto(Step::WhereField);
                Ok(())
            }
            Some(ReservedWord::Order) => self.route(Step::Order),
            Some(ReservedWord::Limit) => self.route(Step::Limit),
            Some(ReservedWord::Using) => self.route(Step::Using),
            Some(ReservedWord::Respond) => self.route(Step::Respond),
            _ => Err(self.unexpected("", "WHERE", &lexeme)),
        }
    }

    fn step_where_field(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        if !is_identifier(&lexeme) {
            return Err(self.unexpected("WHERE", "field", &lexeme));
        }
        if self.plan.conditions.len() >= MAX_CONDITIONS {
            return Err(self.too_many("WHERE", MAX_CONDITIONS));
        }

        // Appended now so a partial plan shows the condition being built
        self.plan.conditions.push(Condition {
            operand1: lexeme.text.to_string(),
            operand1_is_field: true,
            operand2_is_field: true,
            ..Condition::default()
        });
        self.pop(&lexeme);
        self.goto(Step::WhereOperator);
        Ok(())
    }

    fn step_where_operator(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        let operator = lexeme
            .reserved()
            .filter(ReservedWord::is_comparison)
            .and_then(|word| Operator::from_symbol(word.as_str()));

        let Some(operator) = operator else {
            return Err(self.unexpected("WHERE", "comparison operator", &lexeme));
        };
        if let Some(condition) = self.plan.conditions.last_mut() {
            condition.operator = operator;
        }
        self.pop(&lexeme);
        self.goto(Step::WhereValue);
        Ok(())
    }

    fn step_where_value(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        let is_field = match lexeme.kind {
            LexemeKind::Quoted => false,
            _ if is_identifier(&lexeme) => true,
            _ => return Err(self.unexpected("WHERE", "field or quoted value", &lexeme)),
        };
        if let Some(condition) = self.plan.conditions.last_mut() {
            condition.operand2 = lexeme.text.to_string();
            condition.operand2_is_field = is_field;
        }
        self.pop(&lexeme);
        self.goto(Step::WhereAnd);
        Ok(())
    }

    fn step_where_and(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        if lexeme.is_word(AND) {
            self.pop(&lexeme);
            self.goto(Step::WhereField);
            return Ok(());
        }
        match lexeme.reserved() {
            Some(ReservedWord::Order) => self.route(Step::Order),
            Some(ReservedWord::Limit) => self.route(Step::Limit),
            Some(ReservedWord::Using) => self.route(Step::Using),
            Some(ReservedWord::Respond) => self.route(Step::Respond),
            _ => Err(self.unexpected("", "AND", &lexeme)),
        }
    }

    // ========================================================================
    // ORDER BY, LIMIT, USING, RESPOND IN
    // ========================================================================

    fn step_order_by_field(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        if !is_identifier(&lexeme) {
            return Err(self.unexpected("ORDER BY", "field", &lexeme));
        }
        if self.plan.order_by_items.len() >= MAX_ORDER_BY_ITEMS {
            return Err(self.too_many("ORDER BY", MAX_ORDER_BY_ITEMS));
        }
        self.plan.order_by_items.push(lexeme.text.to_string());
        self.pop(&lexeme);

        let next = self.scanner.peek_at(self.cursor)?;
        match next.reserved() {
            Some(ReservedWord::Comma) => {
                self.pop(&next);
                return Ok(());
            }
            Some(ReservedWord::Asc) | Some(ReservedWord::Desc) => {
                self.plan.desc = next.is_reserved(ReservedWord::Desc);
                self.pop(&next);
            }
            _ => {}
        }

        self.goto(Step::Limit);
        Ok(())
    }

    fn step_limit(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        match lexeme.reserved() {
            Some(ReservedWord::Limit) => {
                self.pop(&lexeme);
                self.goto(Step::Count);
                Ok(())
            }
            Some(ReservedWord::Using) => self.route(Step::Using),
            Some(ReservedWord::Respond) => self.route(Step::Respond),
            _ => Err(self.unexpected("", "LIMIT", &lexeme)),
        }
    }

    fn step_count(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        let count = match lexeme.kind {
            LexemeKind::Word if lexeme.text.bytes().all(|b| b.is_ascii_digit()) => {
                lexeme.text.parse::<i64>().ok().filter(|count| *count > 0)
            }
            _ => None,
        };

        let Some(count) = count else {
            return Err(SyntaxError::InvalidCount {
                found: lexeme.describe(),
                offset: self.cursor,
            }
            .into());
        };
        self.plan.count = count;
        self.pop(&lexeme);
        self.goto(Step::Using);
        Ok(())
    }

    fn step_using(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        match lexeme.reserved() {
            Some(ReservedWord::Using) => {
                self.pop(&lexeme);
                self.goto(Step::Data);
                Ok(())
            }
            Some(ReservedWord::Respond) => self.route(Step::Respond),
            _ => Err(self.unexpected("", "USING", &lexeme)),
        }
    }

    fn step_data(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        if !is_identifier(&lexeme) {
            return Err(self.unexpected("USING", "data", &lexeme));
        }
        self.plan.data = lexeme.text.to_string();
        self.pop(&lexeme);
        self.goto(Step::Respond);
        Ok(())
    }

    fn step_mode(&mut self, lexeme: Lexeme<'a>) -> StepResult {
        if !is_identifier(&lexeme) {
            return Err(self.unexpected("RESPOND IN", "mode", &lexeme));
        }
        self.plan.mode = lexeme.text.to_string();
        self.pop(&lexeme);
        self.goto(Step::Done);
        Ok(())
    }

    fn expect_keyword(&mut self, lexeme: Lexeme<'a>, word: ReservedWord, next: Step) -> StepResult {
        if !lexeme.is_reserved(word) {
            return Err(self.unexpected("", word.as_str(), &lexeme));
        }
        self.pop(&lexeme);
        self.goto(next);
        Ok(())
    }

    // ========================================================================
    // CURSOR AND TRANSITIONS
    // ========================================================================

    fn pop(&mut self, lexeme: &Lexeme<'_>) {
        self.cursor = self.scanner.advance(self.cursor, lexeme);
    }

    /// Change step without consuming; the next step sees the same token
    fn route(&mut self, next: Step) -> StepResult {
        self.goto(next);
        Ok(())
    }

    fn goto(&mut self, next: Step) {
        if self.preferences.trace_state_transitions {
            log_debug!("Parser step",
                "from" => self.step,
                "to" => next,
                "cursor" => self.cursor
            );
        }
        self.step = next;
    }

    fn unexpected(&self, clause: &'static str, expected: &'static str, found: &Lexeme<'_>) -> QueryError {
        SyntaxError::unexpected_token(clause, expected, found.describe(), self.cursor).into()
    }

    fn too_many(&self, clause: &'static str, limit: usize) -> QueryError {
        SyntaxError::TooManyItems {
            clause,
            limit,
            offset: self.cursor,
        }
        .into()
    }

    fn fail(self, error: QueryError) -> ParseError {
        let query = self.scanner.source();
        let error = ParseError::new(error, query, self.cursor, self.plan);

        if self.preferences.log_diagnostics {
            log_error!(
                error.error_code(),
                &error.to_string(),
                span = error.span(self.line),
                "kind" => error.kind().as_str(),
                "step" => self.step,
                "diagnostic" => error.render_diagnostic()
            );
        }

        error
    }
}

fn is_identifier(lexeme: &Lexeme<'_>) -> bool {
    lexeme.kind == LexemeKind::Word && is_valid_identifier(lexeme.text)
}

fn is_field_or_asterisk(lexeme: &Lexeme<'_>) -> bool {
    is_identifier(lexeme) || (lexeme.kind == LexemeKind::Word && lexeme.text == "*")
}
