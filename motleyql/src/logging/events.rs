//! Log events emitted by the parser and its drivers

use super::codes::{self, Code};
use crate::utils::Span;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
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
}

const GENERIC_WARNING: Code = Code::new("W000");
const GENERIC_INFO: Code = Code::new("I000");
const GENERIC_DEBUG: Code = Code::new("D000");

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    /// Sorted so text and JSON output are stable
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        let max_len = crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
        let message = if message.len() > max_len {
            let mut cut = max_len;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...", &message[..cut])
        } else {
            message.to_string()
        };

        Self {
            timestamp: Utc::now(),
            level,
            code,
            message,
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, error_code, message)
    }

    /// Warnings may not have codes
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, GENERIC_WARNING, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, GENERIC_INFO, message)
    }

    /// Info event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, GENERIC_DEBUG, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.code.as_str())
    }

    /// Single-line display format
    pub fn format(&self) -> String {
        let span_str = self
            .span
            .as_ref()
            .map(|s| format!(" at {}:{}", s.start().line, s.start().column))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            span_str
        )
    }

    /// Multi-line format with classification metadata
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity()));

        if self.is_error() {
            output.push_str(&format!("\n  Recoverable: {}", self.is_recoverable()));
            output.push_str(&format!("\n  Requires halt: {}", self.requires_halt()));
        }

        let description = self.description();
        if description != "Unknown error" {
            output.push_str(&format!("\n  Description: {}", description));
        }

        let action = self.recommended_action();
        if action != "No specific action available" {
            output.push_str(&format!("\n  Recommended action: {}", action));
        }

        if !self.context.is_empty() {
            output.push_str("\n  Context:");
            for (key, value) in &self.context {
                output.push_str(&format!("\n    {}: {}", key, value));
            }
        }

        output
    }

    /// JSON line for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": self.is_recoverable(),
                "requires_halt": self.requires_halt(),
                "description": self.description(),
                "recommended_action": self.recommended_action(),
            });
        }

        if let Some(span) = &self.span {
            json["span"] = serde_json::json!({
                "start_offset": span.start().offset,
                "start_line": span.start().line,
                "start_column": span.start().column,
                "end_offset": span.end().offset,
                "end_column": span.end().column,
            });
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::to_value(&self.context)?;
        }

        serde_json::to_string(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::Position;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "expected FROM");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E041");
        assert_eq!(event.category(), "Syntax");
        assert!(!event.requires_halt());
    }

    #[test]
    fn test_event_formatting() {
        let span = Span::new(Position::new(9, 1, 10), Position::new(13, 1, 14));
        let event = LogEvent::error(codes::lexical::UNTERMINATED_STRING, "unterminated")
            .with_span(span);

        let formatted = event.format();
        assert_eq!(formatted, "[ERROR] E020 - unterminated at 1:10");

        let detailed = event.format_detailed();
        assert!(detailed.contains("Category: Lexical"));
        assert!(detailed.contains("Recommended action: Close the literal"));
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::semantic::MISSING_MODEL_ZOO, "model zoo name cannot be empty")
            .with_context("query", "SELECT *");

        let json: serde_json::Value = serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "E062");
        assert_eq!(json["context"]["query"], "SELECT *");
        assert_eq!(json["error_metadata"]["requires_halt"], false);
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let max = crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
        let event = LogEvent::info(&"x".repeat(max + 10));
        assert_eq!(event.message.len(), max + 3);
        assert!(event.message.ends_with("..."));
    }
}
