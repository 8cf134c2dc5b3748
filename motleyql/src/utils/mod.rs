//! Shared source-location types

pub mod span;

pub use span::{Position, Span};
