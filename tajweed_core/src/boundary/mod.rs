//! Pause and segmentation boundaries
//!
//! A word end pauses when its stop mark is selected, when it ends a verse
//! and `verse` is selected, or when it is the last word of the request.
//! Verse ends and selected stop marks also split rendered output.

use crate::logging::{codes, Code};
use crate::tables::{SymbolTable, VERSE_STOP_KEY};
use crate::word::Word;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, thiserror::Error)]
pub enum BoundaryError {
    #[error("Unknown stop key '{key}' (known: {known})")]
    UnknownStopKey { key: String, known: String },
}

impl BoundaryError {
    pub fn error_code(&self) -> Code {
        match self {
            BoundaryError::UnknownStopKey { .. } => codes::stops::UNKNOWN_STOP_KEY,
        }
    }
}

/// Resolved state at the end of one word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Boundary {
    /// Recitation stops after this word
    pub pause: bool,
    /// Output grouping splits after this word
    pub segment: bool,
    /// Last word of its verse
    pub verse_end: bool,
}

/// Configured stop keys and their glyphs
#[derive(Debug, Clone, PartialEq)]
pub struct StopTable {
    entries: Vec<(String, char)>,
}

impl StopTable {
    pub fn new(entries: Vec<(String, char)>) -> Self {
        Self { entries }
    }

    pub fn from_symbols(symbols: &SymbolTable) -> Self {
        Self::new(symbols.stops().to_vec())
    }

    pub fn contains(&self, key: &str) -> bool {
        key == VERSE_STOP_KEY || self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn glyph(&self, key: &str) -> Option<char> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, g)| *g)
    }

    /// All selectable keys, `verse` first
    pub fn keys(&self) -> Vec<&str> {
        std::iter::once(VERSE_STOP_KEY)
            .chain(self.entries.iter().map(|(k, _)| k.as_str()))
            .collect()
    }
}

/// Caller-selected active stop keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopSelection(BTreeSet<String>);

impl Default for StopSelection {
    /// Pause at verse ends only
    fn default() -> Self {
        Self::from_keys([VERSE_STOP_KEY])
    }
}

impl StopSelection {
    /// No optional pauses; only the end of the request pauses
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Comma-separated keys; an empty string selects nothing
    pub fn parse_list(list: &str) -> Self {
        Self::from_keys(
            list.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty()),
        )
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for StopSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.iter().collect();
        write!(f, "{{{}}}", keys.join(", "))
    }
}

#[derive(Debug)]
pub struct BoundaryResolver {
    selection: StopSelection,
}

impl BoundaryResolver {
    /// Fails on the first selected key the table does not define
    pub fn new(table: &StopTable, selection: &StopSelection) -> Result<Self, BoundaryError> {
        if let Some(key) = selection.iter().find(|k| !table.contains(k)) {
            return Err(BoundaryError::UnknownStopKey {
                key: key.to_string(),
                known: table.keys().join(", "),
            });
        }

        Ok(Self {
            selection: selection.clone(),
        })
    }

    pub fn resolve(&self, words: &[Word]) -> Vec<Boundary> {
        let verse_active = self.selection.contains(VERSE_STOP_KEY);

        words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let stop_active = word
                    .stop_key()
                    .map(|k| self.selection.contains(k))
                    .unwrap_or(false);
                let last = i + 1 == words.len();

                Boundary {
                    pause: stop_active || (word.verse_end && verse_active) || last,
                    segment: word.verse_end || stop_active,
                    verse_end: word.verse_end,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::symbols::{ClassifiedWord, StopMark};
    use assert_matches::assert_matches;

    fn table() -> StopTable {
        StopTable::new(vec![
            ("optional_stop".to_string(), '\u{06DA}'),
            ("compulsory_stop".to_string(), '\u{06D8}'),
        ])
    }

    fn word(verse: u32, index: u32, stop: Option<&str>, verse_end: bool) -> Word {
        let classified = ClassifiedWord {
            symbols: Vec::new(),
            stop_sign: stop.map(|key| StopMark {
                key: key.to_string(),
                glyph: table().glyph(key).unwrap_or('?'),
            }),
        };
        Word::new(Location::new(1, verse, index), "", classified, verse_end)
    }

    #[test]
    fn test_default_selection_is_verse() {
        let selection = StopSelection::default();
        assert!(selection.contains("verse"));
        assert_eq!(selection.to_string(), "{verse}");
        assert!(StopSelection::none().is_empty());
    }

    #[test]
    fn test_parse_list() {
        let selection = StopSelection::parse_list("verse, optional_stop,");
        assert!(selection.contains("verse"));
        assert!(selection.contains("optional_stop"));
        assert!(StopSelection::parse_list("").is_empty());
    }

    #[test]
    fn test_unknown_key_fails_fast() {
        let selection = StopSelection::from_keys(["verse", "sometimes"]);
        assert_matches!(
            BoundaryResolver::new(&table(), &selection),
            Err(BoundaryError::UnknownStopKey { key, .. }) if key == "sometimes"
        );
    }

    #[test]
    fn test_verse_end_pauses_when_selected() {
        let words = vec![word(1, 1, None, true), word(2, 1, None, true)];

        let resolver = BoundaryResolver::new(&table(), &StopSelection::default()).unwrap();
        let boundaries = resolver.resolve(&words);
        assert!(boundaries[0].pause);
        assert!(boundaries[0].segment);

        let resolver = BoundaryResolver::new(&table(), &StopSelection::none()).unwrap();
        let boundaries = resolver.resolve(&words);
        assert!(!boundaries[0].pause);
        assert!(boundaries[0].segment);
        assert!(boundaries[1].pause);
    }

    #[test]
    fn test_stop_mark_pauses_only_when_selected() {
        let words = vec![
            word(1, 1, Some("optional_stop"), false),
            word(1, 2, None, false),
            word(1, 3, None, true),
        ];

        let inactive = BoundaryResolver::new(&table(), &StopSelection::default())
            .unwrap()
            .resolve(&words);
        assert!(!inactive[0].pause);
        assert!(!inactive[0].segment);
        assert!(!inactive[1].pause);

        let active = BoundaryResolver::new(
            &table(),
            &StopSelection::from_keys(["optional_stop"]),
        )
        .unwrap()
        .resolve(&words);
        assert!(active[0].pause);
        assert!(active[0].segment);
        assert!(active[2].pause);
    }

    #[test]
    fn test_table_keys() {
        let table = table();
        assert_eq!(table.keys(), vec!["verse", "optional_stop", "compulsory_stop"]);
        assert!(table.contains("verse"));
        assert_eq!(table.glyph("verse"), None);
    }
}
