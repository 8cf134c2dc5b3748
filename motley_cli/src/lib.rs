//! # motley CLI
//!
//! Argument definitions, subcommand handlers and the plan executor seam
//! behind the `motley` binary.

pub mod cli;
pub mod commands;
pub mod executor;

pub use executor::{execute, ExecutorError, PlanExecutor, TracingExecutor};
