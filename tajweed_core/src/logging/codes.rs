//! Error and success codes with their classification metadata
//!
//! Every code the crate logs is declared here together with its category,
//! severity and recommended action. Stage error enums map onto these via
//! their `error_code()` methods.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code wrapper shared by error, warning and success events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Reference parsing and resolution
pub mod reference {
    use super::Code;

    pub const GRAMMAR_MISMATCH: Code = Code::new("E010");
    pub const INVALID_COMPONENT: Code = Code::new("E011");
    pub const OUT_OF_RANGE: Code = Code::new("E012");
    pub const RANGE_REVERSED: Code = Code::new("E013");
    pub const REFERENCE_TOO_LONG: Code = Code::new("E014");
}

/// Stop selection
pub mod stops {
    use super::Code;

    pub const UNKNOWN_STOP_KEY: Code = Code::new("E020");
}

/// Symbol and phoneme tables
pub mod tables {
    use super::Code;

    pub const MISSING_MAPPING: Code = Code::new("E030");
    pub const TABLE_IO_ERROR: Code = Code::new("E031");
    pub const TABLE_PARSE_ERROR: Code = Code::new("E032");
    pub const TABLE_TOO_LARGE: Code = Code::new("E033");
    pub const INVALID_TABLE_ENTRY: Code = Code::new("E034");
}

/// Tajweed rule table
pub mod rules {
    use super::Code;

    pub const INVALID_RULE_TABLE: Code = Code::new("E040");
    pub const UNKNOWN_GROUP: Code = Code::new("E041");
    pub const INVALID_NEIGHBOR_OFFSET: Code = Code::new("E042");
    pub const TOO_MANY_RULES: Code = Code::new("E043");
}

/// Word corpus
pub mod corpus {
    use super::Code;

    pub const CORPUS_IO_ERROR: Code = Code::new("E050");
    pub const CORPUS_PARSE_ERROR: Code = Code::new("E051");
    pub const MISSING_WORD: Code = Code::new("E052");
    pub const CORPUS_TOO_LARGE: Code = Code::new("E053");
    pub const INVALID_LOCATION_KEY: Code = Code::new("E054");
}

/// Result export
pub mod export {
    use super::Code;

    pub const UNSUPPORTED_SPLIT: Code = Code::new("E060");
    pub const SERIALIZATION_ERROR: Code = Code::new("E061");
}

/// Batch processing
pub mod batch {
    use super::Code;

    pub const BATCH_TOO_LARGE: Code = Code::new("E070");
    pub const WORKER_PANIC: Code = Code::new("E071");
}

/// Success and progress codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I002");
    pub const REFERENCE_RESOLVED: Code = Code::new("I010");
    pub const BOUNDARIES_RESOLVED: Code = Code::new("I020");
    pub const TABLES_LOADED: Code = Code::new("I030");
    pub const RULES_APPLIED: Code = Code::new("I040");
    pub const RULE_APPLIED: Code = Code::new("I041");
    pub const CORPUS_LOADED: Code = Code::new("I050");
    pub const EXPORT_COMPLETE: Code = Code::new("I060");
    pub const REQUEST_COMPLETE: Code = Code::new("I070");
    pub const BATCH_COMPLETE: Code = Code::new("I071");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

type Entry = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

// (code, category, severity, recoverable, requires_halt, description, action)
#[rustfmt::skip]
const ENTRIES: &[Entry] = &[
    ("ERR001", "System", Severity::Critical, false, true,
        "Critical internal error", "File a bug report with the failing reference"),
    ("ERR002", "System", Severity::Critical, false, true,
        "Initialization failure", "Check configuration tables and environment"),
    ("E010", "Reference", Severity::Medium, true, false,
        "Reference does not match C[:V[:W]] or P - P", "Correct the reference syntax"),
    ("E011", "Reference", Severity::Medium, true, false,
        "Reference component is zero or not a number", "Use positive decimal components"),
    ("E012", "Reference", Severity::Medium, true, false,
        "Reference component outside corpus bounds", "Check chapter, verse and word counts"),
    ("E013", "Reference", Severity::Medium, true, false,
        "Range end precedes range start", "Swap the range endpoints"),
    ("E014", "Reference", Severity::Medium, true, false,
        "Reference string exceeds the length limit", "Split the request"),
    ("E020", "Stops", Severity::Medium, true, false,
        "Requested stop key is not configured", "Use a key from the stop table"),
    ("E030", "Tables", Severity::Critical, false, true,
        "Letter or diacritic has no phoneme mapping", "Complete the phoneme table"),
    ("E031", "Tables", Severity::Critical, false, true,
        "Table file could not be read", "Check the tables directory"),
    ("E032", "Tables", Severity::Critical, false, true,
        "Table file is not valid TOML", "Fix the table syntax"),
    ("E033", "Tables", Severity::High, false, true,
        "Table exceeds a compile-time limit", "Reduce the table or rebuild with larger limits"),
    ("E034", "Tables", Severity::High, false, true,
        "Table entry is malformed", "Use single-codepoint letters and known keys"),
    ("E040", "Rules", Severity::Critical, false, true,
        "Rule table is malformed", "Fix the rule definition"),
    ("E041", "Rules", Severity::Critical, false, true,
        "Rule references an undefined letter group", "Define the group or fix the name"),
    ("E042", "Rules", Severity::High, false, true,
        "Neighbour offset is zero or too far", "Use a non-zero offset within the limit"),
    ("E043", "Rules", Severity::High, false, true,
        "Rule table exceeds the rule limit", "Remove rules or rebuild with larger limits"),
    ("E050", "Corpus", Severity::Critical, false, true,
        "Corpus file could not be read", "Check the corpus path"),
    ("E051", "Corpus", Severity::Critical, false, true,
        "Corpus file is not valid JSON", "Fix the corpus format"),
    ("E052", "Corpus", Severity::High, true, false,
        "Resolved location has no word text", "Check the corpus for gaps"),
    ("E053", "Corpus", Severity::High, false, true,
        "Corpus file exceeds the size limit", "Use a smaller corpus"),
    ("E054", "Corpus", Severity::High, false, true,
        "Corpus key is not a C:V:W location", "Fix the corpus keys"),
    ("E060", "Export", Severity::Medium, true, false,
        "Split mode not representable in this format", "Use word or verse split for CSV"),
    ("E061", "Export", Severity::High, true, false,
        "Result serialization failed", "Check the output sink"),
    ("E070", "Batch", Severity::Medium, true, false,
        "Batch exceeds the request limit", "Split the batch"),
    ("E071", "Batch", Severity::High, true, false,
        "Batch worker panicked", "Rerun the failing request alone"),
    ("I001", "Success", Severity::Low, true, false,
        "Operation completed successfully", "None"),
    ("I002", "Success", Severity::Low, true, false,
        "Logging system initialized", "None"),
    ("I010", "Success", Severity::Low, true, false,
        "Reference resolved to locations", "None"),
    ("I020", "Success", Severity::Low, true, false,
        "Pause and segment boundaries resolved", "None"),
    ("I030", "Success", Severity::Low, true, false,
        "Configuration tables loaded and validated", "None"),
    ("I040", "Success", Severity::Low, true, false,
        "Tajweed rules applied", "None"),
    ("I041", "Success", Severity::Low, true, false,
        "Single rule application", "None"),
    ("I050", "Success", Severity::Low, true, false,
        "Corpus loaded", "None"),
    ("I060", "Success", Severity::Low, true, false,
        "Result exported", "None"),
    ("I070", "Success", Severity::Low, true, false,
        "Phonemize request completed", "None"),
    ("I071", "Success", Severity::Low, true, false,
        "Batch completed", "None"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        ENTRIES
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_is_unique() {
        assert_eq!(get_error_registry().len(), ENTRIES.len());
    }

    #[test]
    fn test_load_time_errors_halt() {
        for code in [
            tables::MISSING_MAPPING,
            rules::INVALID_RULE_TABLE,
            rules::UNKNOWN_GROUP,
        ] {
            assert!(requires_halt(code.as_str()), "{} should halt", code);
            assert!(!is_recoverable(code.as_str()));
        }
    }

    #[test]
    fn test_request_errors_are_recoverable() {
        for code in [reference::GRAMMAR_MISMATCH, stops::UNKNOWN_STOP_KEY] {
            assert!(is_recoverable(code.as_str()));
            assert!(!requires_halt(code.as_str()));
        }
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
        assert!(get_error_metadata("Z999").is_none());
    }

    #[test]
    fn test_metadata_lookup() {
        let metadata = get_error_metadata("E060").unwrap();
        assert_eq!(metadata.category, "Export");
        assert_eq!(metadata.severity, Severity::Medium);
        assert_eq!(get_action("E020"), "Use a key from the stop table");
    }
}
