//! Global logging for the phonemizer
//!
//! Thread-safe global service, per-request event collection and the
//! `log_*!` macro interface.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ProcessingSummary, RequestCollector, RequestContext};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, MultiLogger, StructuredLogger};

use crate::location::Location;

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_REQUEST_COLLECTOR: OnceLock<Arc<RequestCollector>> = OnceLock::new();

thread_local! {
    static REQUEST_CONTEXT: RefCell<Option<RequestContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(LoggingService::from_preferences());
    init_global_logging_with_service(logging_service.clone())?;

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::reference::GRAMMAR_MISMATCH,
        codes::tables::MISSING_MAPPING,
        codes::rules::INVALID_RULE_TABLE,
    ] {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Install a specific service, mainly for tests and embedding callers
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized")?;

    GLOBAL_REQUEST_COLLECTOR
        .set(Arc::new(RequestCollector::new()))
        .map_err(|_| "Global request collector already initialized")?;

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_REQUEST_COLLECTOR.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_request_collector() -> Option<&'static RequestCollector> {
    GLOBAL_REQUEST_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

// ============================================================================
// REQUEST CONTEXT MANAGEMENT
// ============================================================================

pub fn set_request_context(reference: &str, request_id: usize) {
    let context = RequestContext::new(reference, request_id);

    if let Some(collector) = try_get_global_request_collector() {
        collector.record_request_context(context.clone());
    }

    REQUEST_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_request_context() {
    REQUEST_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the given reference as this thread's request context
pub fn with_request_context<F, R>(reference: &str, request_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_request_context(reference, request_id);
    let result = f();
    clear_request_context();
    result
}

pub fn get_current_request_context() -> Option<RequestContext> {
    REQUEST_CONTEXT.with(|ctx| ctx.borrow().clone())
}

fn attach_request_context(event: LogEvent) -> LogEvent {
    if !config::include_request_context() {
        return event;
    }

    match get_current_request_context() {
        Some(ctx) => event
            .with_reference(&ctx.reference)
            .with_context("request_id", &ctx.request_id.to_string()),
        None => event,
    }
}

fn collect(event: &LogEvent) {
    if let Some(ctx) = get_current_request_context() {
        if let Some(collector) = try_get_global_request_collector() {
            collector.record_event(&ctx.reference, event.clone());
        }
    }
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

pub fn log_error_with_context(
    code: Code,
    message: &str,
    location: Option<Location>,
    fields: Vec<(&str, String)>,
) {
    let mut event = LogEvent::error(code, message).with_fields(fields);
    if let Some(l) = location {
        event = event.with_location(l);
    }

    let event = attach_request_context(event);
    collect(&event);

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

pub fn log_success_with_context(code: Code, message: &str, fields: Vec<(&str, String)>) {
    if let Some(logger) = try_get_global_logger() {
        let event = LogEvent::success(code, message).with_fields(fields);
        logger.log_event(attach_request_context(event));
    }
}

pub fn log_info_with_context(message: &str, fields: Vec<(&str, String)>) {
    if let Some(logger) = try_get_global_logger() {
        let event = LogEvent::info(message).with_fields(fields);
        logger.log_event(attach_request_context(event));
    }
}

pub fn log_warning_event(event: LogEvent) {
    let event = attach_request_context(event);
    collect(&event);

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

pub fn log_debug_event(event: LogEvent) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(attach_request_context(event));
    }
}

// ============================================================================
// REPORTING
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_request_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

pub fn get_request_errors(reference: &str) -> Vec<LogEvent> {
    try_get_global_request_collector()
        .map(|collector| collector.get_request_errors(reference))
        .unwrap_or_default()
}

/// Grouped error and warning report for everything collected so far
pub fn format_request_report() -> String {
    try_get_global_request_collector()
        .map(collector::format_request_report)
        .unwrap_or_default()
}

pub fn clear_request_collection() {
    if let Some(collector) = try_get_global_request_collector() {
        collector.clear();
    }
}

pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));

    if let Some(collector) = try_get_global_request_collector() {
        let (current, max, fraction) = collector.get_capacity_info();
        diagnostics.push_str(&format!(
            "Capacity: {}/{} ({:.1}%)\n",
            current,
            max,
            fraction * 100.0
        ));

        let summary = collector.get_summary();
        diagnostics.push_str(&format!("Requests: {}\n", summary.total_requests));
        diagnostics.push_str(&format!("Total errors: {}\n", summary.total_errors));
        diagnostics.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}

/// Log without requiring initialization; falls back to stderr
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_management() {
        assert!(get_current_request_context().is_none());

        set_request_context("1:1", 7);
        let context = get_current_request_context().unwrap();
        assert_eq!(context.reference, "1:1");
        assert_eq!(context.request_id, 7);

        clear_request_context();
        assert!(get_current_request_context().is_none());
    }

    #[test]
    fn test_with_request_context() {
        let result = with_request_context("112", 0, || {
            let context = get_current_request_context();
            assert_eq!(context.map(|c| c.reference), Some("112".to_string()));
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_request_context().is_none());
    }

    #[test]
    fn test_attach_request_context() {
        let event = with_request_context("44:43 - 44:44", 3, || {
            attach_request_context(LogEvent::info("resolving"))
        });

        if config::include_request_context() {
            assert_eq!(
                event.context.get("reference").map(String::as_str),
                Some("44:43 - 44:44")
            );
            assert_eq!(event.context.get("request_id").map(String::as_str), Some("3"));
        } else {
            assert!(event.context.is_empty());
        }
    }

    #[test]
    fn test_safe_logging() {
        safe_log_error(codes::system::INTERNAL_ERROR, "test error");
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Logging Configuration"));
    }
}
