//! Tajweed rule engine
//!
//! Rules are data (`RuleTable`, parsed from TOML) interpreted by a single
//! engine. Pause forms are applied first so that pause-dependent rules see
//! the letter as it is actually recited.

pub mod engine;
pub mod error;
pub mod pause;
pub mod rule;

pub use engine::{EngineOutput, RuleApplication, RuleEngine};
pub use error::RuleTableError;
pub use rule::{Action, GroupRef, Neighbor, Position, Rule, RuleTable, Site, Trigger, VowelState};
