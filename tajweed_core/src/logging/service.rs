//! Logging service and logger backends
//!
//! The service does all level filtering; backends write whatever reaches them.

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level-filtering front for a single logger backend
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Build from the runtime logging preferences
    pub fn from_preferences() -> Self {
        let mut backends = MultiLogger::new();

        if config::use_console_logging() {
            if config::use_structured_logging() {
                backends.add_logger(Arc::new(StructuredLogger));
            } else {
                backends.add_logger(Arc::new(ConsoleLogger));
            }
        }

        Self::new(Arc::new(backends), config::get_min_log_level())
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }
}

/// Human-readable lines on stderr
///
/// Stdout carries phonemizer output, so neither console backend touches it.
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        eprintln!("{}", event.format());
    }
}

/// JSON lines on stderr
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.format_json() {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", event.format()),
        }
    }
}

/// In-memory capture, bounded by the compile-time log buffer size
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events().len()
    }

    pub fn clear(&self) {
        self.events().clear();
    }

    /// Events matching `code`, oldest first
    pub fn events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.events()
            .iter()
            .filter(|e| e.code == code)
            .cloned()
            .collect()
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.events().iter().any(|e| e.code == code)
    }

    /// Error events whose code halts processing
    pub fn halting_errors(&self) -> Vec<LogEvent> {
        self.events()
            .iter()
            .filter(|e| e.is_error() && e.requires_halt())
            .cloned()
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.events();

        let capacity = config::get_log_buffer_size();
        if events.len() >= capacity {
            let overflow = events.len() + 1 - capacity;
            events.drain(..overflow);
        }

        events.push(event.clone());
    }
}

/// Fan-out to several backends
#[derive(Default)]
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_logger(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    /// Add an in-memory backend and hand back a handle for inspection
    pub fn with_memory(mut self) -> (Self, Arc<MemoryLogger>) {
        let memory = Arc::new(MemoryLogger::new());
        self.add_logger(memory.clone());
        (self, memory)
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        for logger in &self.loggers {
            logger.log(event);
        }
    }
}
