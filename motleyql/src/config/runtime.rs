// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPreferences {
    /// Log every state transition at debug level
    pub trace_state_transitions: bool,

    /// Attach the caret diagnostic to logged parse failures
    pub log_diagnostics: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            trace_state_transitions: env_flag(env_vars::PARSER_TRACE_TRANSITIONS, false),
            log_diagnostics: env_flag(env_vars::PARSER_LOG_DIAGNOSTICS, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to require the .mql extension
    pub require_mql_extension: bool,

    /// Whether to log timing and size metrics for each file
    pub enable_performance_logging: bool,

    /// Whether `--` lines are treated as comments
    pub allow_comment_lines: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_mql_extension: env_flag(env_vars::REQUIRE_MQL_EXTENSION, false),
            enable_performance_logging: env_flag(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
            allow_comment_lines: env_flag(env_vars::ALLOW_COMMENT_LINES, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            enable_cargo_style_output: env_flag(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_flag(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

pub fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.trim().to_ascii_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warning),
        "info" => Some(LogLevel::Info),
        "debug" | "trace" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Errors loading a preferences file
#[derive(Debug, thiserror::Error)]
pub enum RuntimeConfigError {
    #[error("Failed to read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// All runtime preferences. Missing sections fall back to their
/// environment-derived defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub parser: ParserPreferences,
    pub file_processor: FileProcessorPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, RuntimeConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, RuntimeConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| RuntimeConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Parser
    pub const PARSER_TRACE_TRANSITIONS: &str = "MOTLEY_PARSER_TRACE_TRANSITIONS";
    pub const PARSER_LOG_DIAGNOSTICS: &str = "MOTLEY_PARSER_LOG_DIAGNOSTICS";

    // File Processor
    pub const REQUIRE_MQL_EXTENSION: &str = "MOTLEY_REQUIRE_MQL_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "MOTLEY_ENABLE_PERFORMANCE_LOGGING";
    pub const ALLOW_COMMENT_LINES: &str = "MOTLEY_ALLOW_COMMENT_LINES";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "MOTLEY_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "MOTLEY_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "MOTLEY_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "MOTLEY_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "MOTLEY_LOGGING_INCLUDE_FILE_CONTEXT";
}
