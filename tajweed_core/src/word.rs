//! Words flowing through the pipeline

use crate::boundary::Boundary;
use crate::location::Location;
use crate::symbols::{ClassifiedWord, StopMark, Symbol};
use serde::Serialize;

/// One word of the resolved range
///
/// `raw_text` and `symbols` are fixed at construction; only `boundary` and
/// `phonemes` are filled in by later stages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    pub location: Location,
    pub raw_text: String,
    #[serde(skip)]
    pub symbols: Vec<Symbol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sign: Option<StopMark>,
    /// Last word of its verse in the corpus
    pub verse_end: bool,
    pub boundary: Boundary,
    pub phonemes: Vec<String>,
}

impl Word {
    pub fn new(
        location: Location,
        raw_text: impl Into<String>,
        classified: ClassifiedWord,
        verse_end: bool,
    ) -> Self {
        Self {
            location,
            raw_text: raw_text.into(),
            symbols: classified.symbols,
            stop_sign: classified.stop_sign,
            verse_end,
            boundary: Boundary {
                verse_end,
                ..Boundary::default()
            },
            phonemes: Vec::new(),
        }
    }

    pub fn stop_key(&self) -> Option<&str> {
        self.stop_sign.as_ref().map(|s| s.key.as_str())
    }

    pub fn letter_count(&self) -> usize {
        self.symbols.iter().filter(|s| s.is_letter()).count()
    }
}
