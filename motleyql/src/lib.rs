//! motleyql: a small query language for selecting models from a model zoo
//!
//! ```text
//! SELECT * FROM models WHERE task = object_detection AND data_type = image
//!     ORDER BY n_param DESC LIMIT 1 USING local_data RESPOND IN fast_mode
//! ```
//!
//! [`parse`] turns one query into a [`Plan`]; [`parse_many`] handles a
//! sequence. Query files (`.mql`) and directories of them go through
//! [`pipeline`] and [`batch`].

// Internal modules
pub mod batch;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod syntax;
pub mod utils;
pub mod validation;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use grammar::{Condition, DataType, Operator, Plan, QueryType};
pub use pipeline::{PipelineError, PipelineResult};
pub use syntax::{parse, parse_many, ErrorKind, ParseError, ParsedBatch, QueryError};

// Re-export pipeline output for JSON consumers
pub use pipeline::output::PipelineOutput;
