//! Phonemize results and their views

pub mod export;
pub mod render;

pub use export::{export, validate_export, ExportError, ExportFormat, ExportSplit};
pub use render::{render, NewlineMode, RenderConfig};

use crate::location::Location;
use crate::symbols::arabic_digits;
use crate::word::Word;
use serde::Serialize;

const RLM: char = '\u{200F}';

#[derive(Debug, Clone, Serialize)]
pub struct PhonemizeResult {
    #[serde(rename = "ref")]
    pub reference: String,
    pub text: String,
    pub words: Vec<Word>,
    pub render: RenderConfig,
}

impl PhonemizeResult {
    pub fn phonemes_flat(&self) -> Vec<&str> {
        self.words
            .iter()
            .flat_map(|w| w.phonemes.iter().map(String::as_str))
            .collect()
    }

    pub fn phonemes_by_word(&self) -> Vec<Vec<&str>> {
        self.words
            .iter()
            .map(|w| w.phonemes.iter().map(String::as_str).collect())
            .collect()
    }

    /// Consecutive words sharing a (chapter, verse)
    pub fn verses(&self) -> Vec<&[Word]> {
        self.words
            .chunk_by(|a, b| a.location.same_verse(&b.location))
            .collect()
    }

    pub fn phonemes_by_verse(&self) -> Vec<Vec<&str>> {
        self.verses()
            .into_iter()
            .map(|words| {
                words
                    .iter()
                    .flat_map(|w| w.phonemes.iter().map(String::as_str))
                    .collect()
            })
            .collect()
    }

    /// verses → words → phonemes
    pub fn phonemes_nested(&self) -> Vec<Vec<Vec<&str>>> {
        self.verses()
            .into_iter()
            .map(|words| {
                words
                    .iter()
                    .map(|w| w.phonemes.iter().map(String::as_str).collect())
                    .collect()
            })
            .collect()
    }

    /// Phoneme count of each word, in order
    pub fn word_lengths(&self) -> Vec<usize> {
        self.words.iter().map(|w| w.phonemes.len()).collect()
    }

    /// Render with the separators chosen at request time
    pub fn phonemes_text(&self) -> String {
        render(&self.words, &self.render)
    }

    pub fn render_with(&self, config: &RenderConfig) -> String {
        render(&self.words, config)
    }
}

/// Split a flat sequence back into words of the given lengths
///
/// Returns `None` when the lengths do not sum to the sequence length.
pub fn regroup<'a, T>(flat: &'a [T], lengths: &[usize]) -> Option<Vec<&'a [T]>> {
    let mut groups = Vec::with_capacity(lengths.len());
    let mut rest = flat;

    for &len in lengths {
        if len > rest.len() {
            return None;
        }
        let (head, tail) = rest.split_at(len);
        groups.push(head);
        rest = tail;
    }

    rest.is_empty().then_some(groups)
}

/// Verse-end marker `RLM ﴿n﴾ RLM` with Arabic-Indic digits
pub fn verse_marker(verse: u32) -> String {
    format!("{RLM}\u{FD3F}{}\u{FD3E}{RLM}", arabic_digits(verse))
}

/// Source text with a verse marker after each verse's last word in range
pub fn assemble_text<'a, I>(words: I) -> String
where
    I: IntoIterator<Item = (Location, &'a str)>,
{
    let mut chunks: Vec<String> = Vec::new();
    let mut words = words.into_iter().peekable();

    while let Some((location, text)) = words.next() {
        chunks.push(text.trim().to_string());

        let verse_done = words
            .peek()
            .map(|(next, _)| !next.same_verse(&location))
            .unwrap_or(true);
        if verse_done {
            chunks.push(verse_marker(location.verse));
        }
    }

    chunks.join(" ")
}
