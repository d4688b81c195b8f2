//! Logging configuration
//!
//! Buffer sizes come from compile-time constants; level and output format
//! come from runtime preferences, installed once per process.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences; only the first call takes effect
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

pub fn get_min_log_level() -> EventsLogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn include_request_context() -> bool {
    get_runtime_preferences().include_request_context
}

pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_events_per_request() -> usize {
    MAX_LOG_EVENTS_PER_REQUEST
}

pub fn get_max_tracked_requests() -> usize {
    MAX_TRACKED_REQUESTS
}

pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_EVENTS_PER_REQUEST > LOG_BUFFER_SIZE {
        return Err("Max log events per request exceeds total buffer size".to_string());
    }

    if MAX_TRACKED_REQUESTS == 0 {
        return Err("At least one request must be trackable".to_string());
    }

    Ok(())
}

/// Human-readable summary for diagnostics output
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Compile-time limits ===\n\
         - Log buffer size: {}\n\
         - Max events per request: {}\n\
         - Max tracked requests: {}\n\
         - Max message length: {}\n\
         === Runtime preferences ===\n\
         - Min log level: {}\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Include request context: {}",
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_REQUEST,
        MAX_TRACKED_REQUESTS,
        MAX_LOG_MESSAGE_LENGTH,
        preferences.min_log_level.as_str(),
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.include_request_context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_summary_lists_limits() {
        let summary = get_config_summary();
        assert!(summary.contains(&format!("Log buffer size: {}", LOG_BUFFER_SIZE)));
        assert!(summary.contains("Min log level:"));
    }

    #[test]
    fn test_limits_are_consistent() {
        assert!(get_max_log_events_per_request() <= get_log_buffer_size());
        assert!(get_max_tracked_requests() > 0);
    }
}
