//! Global logging for the motleyql parser
//!
//! Thread-safe global logging with per-file error collection, cargo-style
//! reporting and a macro interface (`log_error!`, `log_info!`, ...).

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, FileLogger, Logger, LoggingService, MemoryLogger, MultiLogger, StructuredLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;
    init_global_logging_with_service(Arc::new(service::create_configured_service()))?;

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::success(
            codes::success::SYSTEM_INITIALIZATION_COMPLETED,
            "Global logging system initialized",
        ));
    }

    Ok(())
}

/// Initialize with a custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;

    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized".to_string())?;

    Ok(())
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

/// True when debug events would reach the global logger
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    let context = FileProcessingContext::new(file_path, file_id);

    if let Some(collector) = try_get_global_error_collector() {
        collector.record_file_context(context.clone());
    }

    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with a file context installed on the current thread
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path, file_id);
    let result = f();
    clear_file_context();
    result
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

fn attach_file_context(mut event: LogEvent) -> LogEvent {
    if config::include_file_context() {
        if let Some(file_ctx) = get_current_file_context() {
            event = event.with_context("file", &file_ctx.file_path.display().to_string());
            event = event.with_context("file_id", &file_ctx.file_id.to_string());
        }
    }
    event
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Backs `log_error!`. Errors raised inside a file context are also
/// recorded in the global collector.
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);

    if let Some(s) = span {
        event = event.with_span(s);
    }

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    let event = attach_file_context(event);

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event.clone());
    }

    if let Some(file_ctx) = get_current_file_context() {
        if let Some(collector) = try_get_global_error_collector() {
            collector.record_event(&file_ctx.file_path, event);
        }
    }
}

/// Backs `log_warning!`. Warnings are collected like errors.
pub fn log_warning_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::warning(message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    let event = attach_file_context(event);

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event.clone());
    }

    if let Some(file_ctx) = get_current_file_context() {
        if let Some(collector) = try_get_global_error_collector() {
            collector.record_event(&file_ctx.file_path, event);
        }
    }
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    log_plain(LogEvent::success(code, message), context);
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    log_plain(LogEvent::info(message), context);
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    log_plain(LogEvent::debug(message), context);
}

fn log_plain(mut event: LogEvent, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        if !logger.should_log(event.level) {
            return;
        }
        for (key, value) in context {
            event = event.with_context(key, value);
        }
        logger.log_event(attach_file_context(event));
    }
}

// ============================================================================
// BATCH REPORTING
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

/// Print the cargo-style report of everything collected so far
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }
    if let Some(collector) = try_get_global_error_collector() {
        let report = collector::format_cargo_style_errors(collector);
        if !report.is_empty() {
            eprint!("{}", report);
        }
    }
}
