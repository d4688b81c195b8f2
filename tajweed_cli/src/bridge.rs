//! Forwards core log events to the `log` facade so env_logger owns stderr

use tajweed_core::logging::{LogEvent, LogLevel, Logger};

pub struct LogBridge;

impl LogBridge {
    fn level(level: LogLevel) -> log::Level {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        }
    }

    /// `CODE message at C:V:W {k=v, ...}` with context keys sorted
    pub fn render(event: &LogEvent) -> String {
        let mut line = format!("{} {}", event.code.as_str(), event.message);

        if let Some(location) = &event.location {
            line.push_str(&format!(" at {}", location));
        }

        if !event.context.is_empty() {
            let mut pairs: Vec<(&String, &String)> = event.context.iter().collect();
            pairs.sort();
            let joined: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            line.push_str(&format!(" {{{}}}", joined.join(", ")));
        }

        line
    }
}

impl Logger for LogBridge {
    fn log(&self, event: &LogEvent) {
        log::log!(target: "tajweed_core", Self::level(event.level), "{}", Self::render(event));
    }
}
