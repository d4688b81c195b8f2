//! Runtime preferences
//!
//! User-adjustable behaviour read from `TAJWEED_*` environment variables.
//! Hard limits live in `compile_time` and cannot be overridden here.

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of human-readable text
    pub use_structured_logging: bool,

    /// Write events to stderr as they happen
    pub enable_console_logging: bool,

    /// Minimum level that reaches the loggers
    /// Note: errors are always recorded in the request collector
    pub min_log_level: LogLevel,

    /// Attach the active reference to every event
    pub include_request_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_request_context: env_flag(env_vars::LOGGING_INCLUDE_REQUEST_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnginePreferences {
    /// Log a debug event for every rule that fires
    pub log_rule_applications: bool,

    /// Log letter, override and rule counts when tables load
    pub log_table_statistics: bool,
}

impl Default for EnginePreferences {
    fn default() -> Self {
        Self {
            log_rule_applications: env_flag(env_vars::ENGINE_LOG_RULE_APPLICATIONS, false),
            log_table_statistics: env_flag(env_vars::ENGINE_LOG_TABLE_STATISTICS, true),
        }
    }
}

/// Boolean environment value; unset or unparsable falls back to `default`
fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
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

/// Parse a log level from an environment value or CLI flag
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "TAJWEED_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "TAJWEED_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "TAJWEED_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_REQUEST_CONTEXT: &str = "TAJWEED_LOGGING_INCLUDE_REQUEST_CONTEXT";

    // Engine
    pub const ENGINE_LOG_RULE_APPLICATIONS: &str = "TAJWEED_ENGINE_LOG_RULE_APPLICATIONS";
    pub const ENGINE_LOG_TABLE_STATISTICS: &str = "TAJWEED_ENGINE_LOG_TABLE_STATISTICS";
}
