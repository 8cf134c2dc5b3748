//! Per-file event collection with cargo-style reporting

use super::events::LogEvent;
use crate::config::compile_time::logging::{MAX_ERROR_COLLECTION, MAX_LOG_EVENTS_PER_FILE};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Context keys that are rendered elsewhere in the cargo-style output
const HIDDEN_CONTEXT_KEYS: [&str; 3] = ["file", "file_id", "diagnostic"];

// ============================================================================
// FILE PROCESSING CONTEXT
// ============================================================================

#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.successful_files as f64 / self.total_files as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe collector keyed by file path
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    file_contexts: Mutex<BTreeMap<PathBuf, FileProcessingContext>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            file_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn events(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.file_events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn contexts(&self) -> MutexGuard<'_, BTreeMap<PathBuf, FileProcessingContext>> {
        self.file_contexts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an event for a file. Past the per-file limit a single
    /// overflow warning is stored and later events are dropped.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.events();

        let total_errors: usize = events
            .values()
            .map(|file_events| file_events.iter().filter(|e| e.is_error()).count())
            .sum();
        if event.is_error() && total_errors >= MAX_ERROR_COLLECTION {
            return;
        }

        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn record_file_context(&self, context: FileProcessingContext) {
        self.contexts().insert(context.file_path.clone(), context);
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.events().get(file_path).cloned().unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        self.events()
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        !self.get_file_errors(file_path).is_empty()
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.events().clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.events();
        let contexts = self.contexts();

        let mut summary = ProcessingSummary {
            total_files: contexts.len().max(events.len()),
            total_processing_time: self.processing_start.elapsed(),
            ..ProcessingSummary::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary.successful_files =
            summary.total_files - summary.failed_files - summary.files_with_warnings;

        summary
    }

    pub fn clear(&self) {
        self.events().clear();
        self.contexts().clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

fn push_event(output: &mut String, label: &str, file_path: &Path, event: &LogEvent) {
    let span_info = event
        .span
        .as_ref()
        .map(|s| {
            format!(
                "\n  --> {}:{}:{}",
                file_path.display(),
                s.start().line,
                s.start().column
            )
        })
        .unwrap_or_default();

    output.push_str(&format!(
        "{}[{}]: {}{}\n",
        label,
        event.code.as_str(),
        event.message,
        span_info
    ));

    if let Some(diagnostic) = event.context.get("diagnostic") {
        output.push_str("   |\n");
        for line in diagnostic.lines() {
            output.push_str(&format!("   | {}\n", line));
        }
    }

    for (key, value) in &event.context {
        if !HIDDEN_CONTEXT_KEYS.contains(&key.as_str()) {
            output.push_str(&format!("   = {}: {}\n", key, value));
        }
    }

    if event.is_error() {
        let action = event.recommended_action();
        if action != "No specific action available" {
            output.push_str(&format!("   = help: {}\n", action));
        }
    }
}

/// Errors and warnings grouped by file, followed by totals
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));
        for event in errors {
            push_event(&mut output, "error", file_path, event);
        }
        for event in warnings {
            push_event(&mut output, "warning", file_path, event);
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_error_collector_basic() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("queries.mql");

        collector.record_event(
            &file_path,
            LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "at SELECT: expected FROM"),
        );

        assert_eq!(collector.get_file_events(&file_path).len(), 1);
        assert!(collector.file_has_errors(&file_path));
    }

    #[test]
    fn test_processing_summary() {
        let collector = ErrorCollector::new();

        collector.record_file_context(FileProcessingContext::new(PathBuf::from("a.mql"), 0));
        collector.record_file_context(FileProcessingContext::new(PathBuf::from("b.mql"), 1));
        collector.record_file_context(FileProcessingContext::new(PathBuf::from("c.mql"), 2));

        collector.record_event(
            Path::new("a.mql"),
            LogEvent::error(codes::lexical::UNTERMINATED_STRING, "unterminated"),
        );
        collector.record_event(Path::new("b.mql"), LogEvent::warning("no queries"));

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert_eq!(summary.successful_files, 1);
        assert_eq!(summary.total_errors, 1);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_per_file_limit() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("noisy.mql");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(&file_path, LogEvent::warning("repeated"));
        }

        let events = collector.get_file_events(&file_path);
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_FILE + 1);
        assert!(events.last().unwrap().message.starts_with("Too many events"));
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("queries.mql");
        let span = Span::new(Position::new(20, 3, 21), Position::new(20, 3, 21));

        collector.record_event(
            &file_path,
            LogEvent::error(codes::semantic::EMPTY_WHERE_CLAUSE, "at WHERE: empty WHERE clause")
                .with_span(span)
                .with_context("diagnostic", "SELECT * FROM models WHERE\n                          ^")
                .with_context("query_index", "2"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking queries.mql..."));
        assert!(output.contains("error[E060]: at WHERE: empty WHERE clause"));
        assert!(output.contains("--> queries.mql:3:21"));
        assert!(output.contains("   | SELECT * FROM models WHERE"));
        assert!(output.contains("   = query_index: 2"));
        assert!(output.contains("   = help: Add a condition after WHERE"));
        assert!(output.contains("Total errors: 1"));
    }
}
