//! Per-request event collection
//!
//! Events logged while a request context is active are grouped under the
//! request's reference string so a batch run can report them together.

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

// ============================================================================
// REQUEST CONTEXT
// ============================================================================

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub reference: String,
    pub request_id: usize,
    pub start_time: Instant,
}

impl RequestContext {
    pub fn new(reference: impl Into<String>, request_id: usize) -> Self {
        Self {
            reference: reference.into(),
            request_id,
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
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub requests_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
    pub average_request_time: Duration,
}

impl ProcessingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

// ============================================================================
// REQUEST COLLECTOR
// ============================================================================

pub struct RequestCollector {
    request_events: Mutex<BTreeMap<String, Vec<LogEvent>>>,
    request_contexts: Mutex<BTreeMap<String, RequestContext>>,
    processing_start: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RequestCollector {
    pub fn new() -> Self {
        Self {
            request_events: Mutex::new(BTreeMap::new()),
            request_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event under a reference
    ///
    /// New references beyond `MAX_TRACKED_REQUESTS` are dropped. Once a
    /// request reaches `MAX_LOG_EVENTS_PER_REQUEST` a single overflow warning
    /// is appended and further events are discarded.
    pub fn record_event(&self, reference: &str, event: LogEvent) {
        let mut events = lock(&self.request_events);

        if !events.contains_key(reference) && events.len() >= MAX_TRACKED_REQUESTS {
            return;
        }

        let request_events = events.entry(reference.to_string()).or_default();

        if request_events.len() < MAX_LOG_EVENTS_PER_REQUEST {
            request_events.push(event);
        } else if request_events.len() == MAX_LOG_EVENTS_PER_REQUEST {
            request_events.push(LogEvent::warning(&format!(
                "Too many events for request (limit: {})",
                MAX_LOG_EVENTS_PER_REQUEST
            )));
        }
    }

    pub fn record_request_context(&self, context: RequestContext) {
        let mut contexts = lock(&self.request_contexts);
        if contexts.len() < MAX_TRACKED_REQUESTS || contexts.contains_key(&context.reference) {
            contexts.insert(context.reference.clone(), context);
        }
    }

    pub fn get_request_events(&self, reference: &str) -> Vec<LogEvent> {
        lock(&self.request_events)
            .get(reference)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_request_errors(&self, reference: &str) -> Vec<LogEvent> {
        lock(&self.request_events)
            .get(reference)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn request_has_errors(&self, reference: &str) -> bool {
        lock(&self.request_events)
            .get(reference)
            .map(|events| events.iter().any(|e| e.is_error()))
            .unwrap_or(false)
    }

    pub fn get_all_request_events(&self) -> BTreeMap<String, Vec<LogEvent>> {
        lock(&self.request_events).clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = lock(&self.request_events);
        let contexts = lock(&self.request_contexts);

        let mut summary = ProcessingSummary {
            total_requests: contexts.len().max(events.len()),
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        for request_events in events.values() {
            let errors = request_events.iter().filter(|e| e.is_error()).count();
            let warnings = request_events.iter().filter(|e| e.is_warning()).count();

            summary.total_errors += errors;
            summary.total_warnings += warnings;

            if errors > 0 {
                summary.failed_requests += 1;
            } else if warnings > 0 {
                summary.requests_with_warnings += 1;
            }
        }

        summary.successful_requests =
            summary.total_requests - summary.failed_requests - summary.requests_with_warnings;

        if !contexts.is_empty() {
            let total: Duration = contexts.values().map(|c| c.elapsed()).sum();
            summary.average_request_time = total / contexts.len() as u32;
        }

        summary
    }

    pub fn get_critical_errors(&self) -> Vec<(String, LogEvent)> {
        lock(&self.request_events)
            .iter()
            .flat_map(|(reference, events)| {
                events
                    .iter()
                    .filter(|e| e.is_error() && e.requires_halt())
                    .map(move |e| (reference.clone(), e.clone()))
            })
            .collect()
    }

    pub fn total_event_count(&self) -> usize {
        lock(&self.request_events).values().map(|v| v.len()).sum()
    }

    /// (current, max, fraction) of the global log buffer
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        (current, LOG_BUFFER_SIZE, current as f64 / LOG_BUFFER_SIZE as f64)
    }

    pub fn clear(&self) {
        lock(&self.request_events).clear();
        lock(&self.request_contexts).clear();
    }
}

impl Default for RequestCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// REPORT FORMATTING
// ============================================================================

/// Compiler-style report of errors and warnings grouped by reference
pub fn format_request_report(collector: &RequestCollector) -> String {
    let mut output = String::new();

    for (reference, events) in &collector.get_all_request_events() {
        let issues: Vec<&LogEvent> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if issues.is_empty() {
            continue;
        }

        output.push_str(&format!("Phonemizing {}...\n", reference));

        for event in issues {
            let kind = if event.is_error() { "error" } else { "warning" };
            let location_info = event
                .location
                .map(|l| format!(" --> {}", l))
                .unwrap_or_default();

            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                kind,
                event.code.as_str(),
                event.message,
                location_info
            ));

            let mut keys: Vec<&String> = event
                .context
                .keys()
                .filter(|k| k.as_str() != "reference" && k.as_str() != "request_id")
                .collect();
            keys.sort();
            for key in keys {
                output.push_str(&format!("  = {}: {}\n", key, event.context[key]));
            }

            if let Some(action) = event.recommended_action().filter(|_| event.is_error()) {
                output.push_str(&format!("  = help: {}\n", action));
            }
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
