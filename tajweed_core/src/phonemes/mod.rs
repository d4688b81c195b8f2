//! Baseline phoneme mapping
//!
//! Each letter cluster becomes a `LetterUnit` holding its consonant, vowel
//! and nasal tokens before any Tajweed rule is applied.

pub mod mapper;

pub use mapper::{BaseMapper, LetterUnit};
