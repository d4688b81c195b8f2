//! Typed symbol clusters produced by the classifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// Short-vowel, nunation and no-vowel marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiacriticKind {
    Fatha,
    Damma,
    Kasra,
    Fathatan,
    Dammatan,
    Kasratan,
    Sukun,
}

impl DiacriticKind {
    pub const ALL: [DiacriticKind; 7] = [
        DiacriticKind::Fatha,
        DiacriticKind::Damma,
        DiacriticKind::Kasra,
        DiacriticKind::Fathatan,
        DiacriticKind::Dammatan,
        DiacriticKind::Kasratan,
        DiacriticKind::Sukun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiacriticKind::Fatha => "fatha",
            DiacriticKind::Damma => "damma",
            DiacriticKind::Kasra => "kasra",
            DiacriticKind::Fathatan => "fathatan",
            DiacriticKind::Dammatan => "dammatan",
            DiacriticKind::Kasratan => "kasratan",
            DiacriticKind::Sukun => "sukun",
        }
    }

    pub fn is_tanween(&self) -> bool {
        matches!(
            self,
            DiacriticKind::Fathatan | DiacriticKind::Dammatan | DiacriticKind::Kasratan
        )
    }

    /// Short vowel underlying a tanween mark; other kinds map to themselves
    pub fn short_form(&self) -> DiacriticKind {
        match self {
            DiacriticKind::Fathatan => DiacriticKind::Fatha,
            DiacriticKind::Dammatan => DiacriticKind::Damma,
            DiacriticKind::Kasratan => DiacriticKind::Kasra,
            other => *other,
        }
    }
}

impl fmt::Display for DiacriticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recitation pause annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopMark {
    pub key: String,
    pub glyph: char,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// Consonant or vowel letter opening a cluster
    Letter { grapheme: char, is_geminated: bool },
    /// Vowel mark bound to the preceding letter
    Diacritic { kind: DiacriticKind },
    /// Lengthening letter or small mark bound to the preceding letter
    Extension { grapheme: char },
    StopMark(StopMark),
    /// Anything unrecognised; never produces phonemes
    Other { raw: char },
}

impl Symbol {
    pub fn is_letter(&self) -> bool {
        matches!(self, Symbol::Letter { .. })
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Symbol::Other { .. })
    }

    pub fn letter_grapheme(&self) -> Option<char> {
        match self {
            Symbol::Letter { grapheme, .. } => Some(*grapheme),
            _ => None,
        }
    }
}

/// Classification output for one word
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassifiedWord {
    pub symbols: Vec<Symbol>,
    /// Rightmost stop glyph in the word
    pub stop_sign: Option<StopMark>,
}

impl ClassifiedWord {
    pub fn letters(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_letter())
    }
}
