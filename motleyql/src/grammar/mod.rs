//! Grammar vocabulary and the Plan data model

pub mod keywords;
pub mod plan;

pub use keywords::{is_reserved_word, is_valid_identifier, ReservedWord, RESERVED_WORDS};
pub use plan::{Condition, DataType, Operator, Plan, QueryType};
