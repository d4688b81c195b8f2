//! Rule table validation errors

use crate::config::compile_time::rules::{MAX_GROUPS, MAX_NEIGHBOR_OFFSET, MAX_RULES};
use crate::logging::{codes, Code};

/// A rule table that cannot be used; raised at load time only
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleTableError {
    #[error("Rule '{rule}' references unknown letter group '{group}'")]
    UnknownGroup { rule: String, group: String },

    #[error("Rule '{rule}' has neighbour offset {offset} (must be non-zero and within ±{MAX_NEIGHBOR_OFFSET})")]
    InvalidNeighborOffset { rule: String, offset: i32 },

    #[error("'{letter}' in {context} is not a single codepoint")]
    MultiCodepointLetter { context: String, letter: String },

    #[error("'{letter}' in {context} is not a classified letter")]
    UnknownLetter { context: String, letter: String },

    #[error("Rule #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("Duplicate rule name '{rule}'")]
    DuplicateName { rule: String },

    #[error("Too many rules: {count} (max {MAX_RULES})")]
    TooManyRules { count: usize },

    #[error("Too many letter groups: {count} (max {MAX_GROUPS})")]
    TooManyGroups { count: usize },
}

impl RuleTableError {
    pub fn error_code(&self) -> Code {
        match self {
            RuleTableError::UnknownGroup { .. } => codes::rules::UNKNOWN_GROUP,
            RuleTableError::InvalidNeighborOffset { .. } => codes::rules::INVALID_NEIGHBOR_OFFSET,
            RuleTableError::TooManyRules { .. } | RuleTableError::TooManyGroups { .. } => {
                codes::rules::TOO_MANY_RULES
            }
            RuleTableError::MultiCodepointLetter { .. }
            | RuleTableError::UnknownLetter { .. }
            | RuleTableError::EmptyName { .. }
            | RuleTableError::DuplicateName { .. } => codes::rules::INVALID_RULE_TABLE,
        }
    }
}
