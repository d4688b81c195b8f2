//! Reference resolution errors

use crate::config::compile_time::reference::{MAX_COMPONENT_VALUE, MAX_REFERENCE_LENGTH};
use crate::location::Location;
use crate::logging::{codes, Code};
use thiserror::Error;

pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// An invalid reference; the request is aborted with no partial result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReferenceError {
    #[error("'{input}' does not match C[:V[:W]] or C[:V[:W]] - C[:V[:W]]")]
    GrammarMismatch { input: String },

    #[error("Invalid {component} '{value}': must be between 1 and {MAX_COMPONENT_VALUE}")]
    InvalidComponent { component: String, value: String },

    #[error("{component} {value} is out of range (max {max}{context})")]
    OutOfRange {
        component: String,
        value: u32,
        max: u32,
        context: String,
    },

    #[error("Range end {end} precedes start {start}")]
    RangeReversed { start: Location, end: Location },

    #[error("Reference is {length} bytes long (max {MAX_REFERENCE_LENGTH})")]
    TooLong { length: usize },

    #[error("Reference pattern failed to compile: {message}")]
    Pattern { message: String },
}

impl ReferenceError {
    pub fn out_of_range(component: &str, value: u32, max: u32, context: String) -> Self {
        Self::OutOfRange {
            component: component.to_string(),
            value,
            max,
            context,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            ReferenceError::GrammarMismatch { .. } => codes::reference::GRAMMAR_MISMATCH,
            ReferenceError::InvalidComponent { .. } => codes::reference::INVALID_COMPONENT,
            ReferenceError::OutOfRange { .. } => codes::reference::OUT_OF_RANGE,
            ReferenceError::RangeReversed { .. } => codes::reference::RANGE_REVERSED,
            ReferenceError::TooLong { .. } => codes::reference::REFERENCE_TOO_LONG,
            ReferenceError::Pattern { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}
