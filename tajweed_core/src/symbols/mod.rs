//! Symbol classification
//!
//! Turns one word's raw text into typed clusters: a base letter with its
//! gemination flag, followed by the diacritics and extensions bound to it.
//! Stop glyphs are surfaced separately so the boundary resolver can see them.

pub mod classifier;
pub mod symbol;

pub use classifier::SymbolClassifier;
pub use symbol::{ClassifiedWord, DiacriticKind, StopMark, Symbol};

/// Arabic-Indic digits used for verse-number glyph words
pub fn is_verse_number(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| ('\u{0660}'..='\u{0669}').contains(&c))
}

/// Render a number with Arabic-Indic digits
pub fn arabic_digits(n: u32) -> String {
    n.to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32(0x0660 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}
