//! Table loading errors

use crate::config::compile_time::tables::MAX_TABLE_FILE_SIZE;
use crate::logging::{codes, Code};
use crate::tajweed::RuleTableError;

pub type TableResult<T> = Result<T, TableError>;

/// Configuration-integrity errors, raised while loading tables
#[derive(Debug, Clone, thiserror::Error)]
pub enum TableError {
    #[error("No phoneme mapping for {what}")]
    MissingMapping { what: String },

    #[error("Cannot read table '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Invalid TOML in {table} table: {message}")]
    Parse { table: String, message: String },

    #[error("Table file '{path}' is {size} bytes (max {MAX_TABLE_FILE_SIZE})")]
    TooLarge { path: String, size: u64 },

    #[error("Invalid {table} table entry '{entry}': {reason}")]
    InvalidEntry {
        table: String,
        entry: String,
        reason: String,
    },

    #[error("Rule table rejected: {0}")]
    Rules(#[from] RuleTableError),
}

impl TableError {
    pub fn missing_mapping(what: impl Into<String>) -> Self {
        Self::MissingMapping { what: what.into() }
    }

    pub fn parse(table: &str, error: impl std::fmt::Display) -> Self {
        Self::Parse {
            table: table.to_string(),
            message: error.to_string(),
        }
    }

    pub fn invalid_entry(table: &str, entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            table: table.to_string(),
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            TableError::MissingMapping { .. } => codes::tables::MISSING_MAPPING,
            TableError::Io { .. } => codes::tables::TABLE_IO_ERROR,
            TableError::Parse { .. } => codes::tables::TABLE_PARSE_ERROR,
            TableError::TooLarge { .. } => codes::tables::TABLE_TOO_LARGE,
            TableError::InvalidEntry { .. } => codes::tables::INVALID_TABLE_ENTRY,
            TableError::Rules(e) => e.error_code(),
        }
    }
}
