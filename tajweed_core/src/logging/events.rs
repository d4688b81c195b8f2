//! Log events

use super::codes::{self, Code, ErrorMetadata};
use crate::location::Location;
use std::collections::HashMap;
use std::time::SystemTime;

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

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub location: Option<Location>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    fn build(level: LogLevel, code: Code, message: &str) -> Self {
        let limit = crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
        let message = if message.len() > limit {
            let mut cut = limit;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...", &message[..cut])
        } else {
            message.to_string()
        };

        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message,
            location: None,
            context: HashMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::build(LogLevel::Error, code, message)
    }

    /// Warning without a specific code
    pub fn warning(message: &str) -> Self {
        Self::build(LogLevel::Warning, Code::new("W000"), message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::build(LogLevel::Warning, code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::build(LogLevel::Info, Code::new("I000"), message)
    }

    /// Info event carrying a success code
    pub fn success(code: Code, message: &str) -> Self {
        Self::build(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::build(LogLevel::Debug, Code::new("D000"), message)
    }

    /// Attach the word location the event concerns
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Attach pre-formatted context pairs from the logging macros
    pub fn with_fields(mut self, fields: Vec<(&str, String)>) -> Self {
        self.context
            .extend(fields.into_iter().map(|(k, v)| (k.to_string(), v)));
        self
    }

    pub fn with_reference(self, reference: &str) -> Self {
        self.with_context("reference", reference)
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    fn metadata(&self) -> Option<&'static ErrorMetadata> {
        codes::get_error_metadata(self.code.as_str())
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn recommended_action(&self) -> Option<&'static str> {
        self.metadata().map(|m| m.recommended_action)
    }

    /// Context pairs sorted by key
    fn sorted_context(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .context
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Single-line human-readable form
    pub fn format(&self) -> String {
        let location_str = self
            .location
            .as_ref()
            .map(|l| format!(" at {}", l))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            location_str
        )
    }

    /// Multi-line form with registry metadata and context
    pub fn format_detailed(&self) -> String {
        let mut lines = vec![self.format()];
        lines.push(format!("  Category: {} ({})", self.category(), self.severity()));

        if let Some(metadata) = self.metadata().filter(|_| self.is_error()) {
            lines.push(format!("  Requires halt: {}", metadata.requires_halt));
            lines.push(format!("  Description: {}", metadata.description));
            lines.push(format!("  Recommended action: {}", metadata.recommended_action));
        }

        for (key, value) in self.sorted_context() {
            lines.push(format!("  {} = {}", key, value));
        }

        lines.join("\n")
    }

    /// JSON line for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let timestamp = self
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut json = serde_json::json!({
            "timestamp": timestamp,
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if let Some(metadata) = self.metadata().filter(|_| self.is_error()) {
            json["recoverable"] = metadata.recoverable.into();
            json["requires_halt"] = metadata.requires_halt.into();
        }

        if let Some(location) = &self.location {
            json["location"] = serde_json::to_value(location)?;
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::json!(self.context);
        }

        serde_json::to_string(&json)
    }
}
