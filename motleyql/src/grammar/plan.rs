//! The parse result: a Plan and its conditions
//!
//! Plans are plain values. They serialize to JSON for executors and can be
//! re-checked with [`Plan::validate`] after being loaded back.

use super::keywords::is_valid_identifier;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QueryType {
    #[default]
    Unknown,
    Select,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Select => "SELECT",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    Unknown,
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
        }
    }

    /// Operator for a comparison symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Gte),
            "<=" => Some(Self::Lte),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of data a model consumes. Vocabulary for executors; the parser
/// never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Image,
    Text,
    Speech,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Text => "text",
            Self::Speech => "speech",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Some(Self::Image),
            "text" => Some(Self::Text),
            "speech" => Some(Self::Speech),
            _ => None,
        }
    }
}

/// One WHERE comparison
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Condition {
    pub operand1: String,
    pub operand1_is_field: bool,
    pub operator: Operator,
    pub operand2: String,
    /// False when the right side was a quoted literal
    pub operand2_is_field: bool,
}

impl Condition {
    /// Condition comparing `field` against another field
    pub fn field(field: &str, operator: Operator, other: &str) -> Self {
        Self {
            operand1: field.to_string(),
            operand1_is_field: true,
            operator,
            operand2: other.to_string(),
            operand2_is_field: true,
        }
    }

    /// Condition comparing `field` against a literal
    pub fn literal(field: &str, operator: Operator, value: &str) -> Self {
        Self {
            operand2_is_field: false,
            ..Self::field(field, operator, value)
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.operand1, self.operator)?;
        if self.operand2_is_field {
            write!(f, "{}", self.operand2)
        } else {
            write!(f, "'{}'", self.operand2)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Plan {
    pub kind: QueryType,
    pub fields: Vec<String>,
    pub model_zoo: String,
    pub conditions: Vec<Condition>,
    pub order_by_items: Vec<String>,
    pub desc: bool,
    /// 0 means no limit
    pub count: i64,
    pub data: String,
    pub mode: String,
}

impl Plan {
    pub fn has_limit(&self) -> bool {
        self.count > 0
    }

    /// Re-check the well-formedness invariants
    pub fn validate(&self) -> Result<(), crate::validation::SemanticError> {
        crate::validation::validate_plan(self)
    }
}

impl fmt::Display for Plan {
    /// Canonical query text for the plan
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} FROM ", self.kind, self.fields.join(", "))?;
        if is_valid_identifier(&self.model_zoo) {
            write!(f, "{}", self.model_zoo)?;
        } else {
            write!(f, "'{}'", self.model_zoo)?;
        }

        for (index, condition) in self.conditions.iter().enumerate() {
            let keyword = if index == 0 { "WHERE" } else { "AND" };
            write!(f, " {} {}", keyword, condition)?;
        }

        if !self.order_by_items.is_empty() {
            write!(f, " ORDER BY {}", self.order_by_items.join(", "))?;
            if self.desc {
                write!(f, " DESC")?;
            }
        }
        if self.has_limit() {
            write!(f, " LIMIT {}", self.count)?;
        }
        if !self.data.is_empty() {
            write!(f, " USING {}", self.data)?;
        }
        if !self.mode.is_empty() {
            write!(f, " RESPOND IN {}", self.mode)?;
        }

        Ok(())
    }
}
