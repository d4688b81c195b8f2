//! Word corpus access
//!
//! The phonemizer never reads scripture text itself; it asks a `Corpus` for
//! counts and word text. `MemoryCorpus` is the bundled implementation over
//! the word-by-word JSON format.

pub mod memory;

pub use memory::MemoryCorpus;

use crate::location::Location;
use crate::logging::{codes, Code};
use thiserror::Error;

pub type CorpusResult<T> = Result<T, CorpusError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorpusError {
    #[error("Failed to read corpus '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Corpus is not valid JSON: {message}")]
    Parse { message: String },

    #[error("Corpus key '{key}' is not a C:V:W location")]
    InvalidLocationKey { key: String },

    #[error("Corpus file '{path}' is {size} bytes, over the limit")]
    TooLarge { path: String, size: u64 },

    #[error("No word text at {location}")]
    MissingWord { location: Location },
}

impl CorpusError {
    pub fn error_code(&self) -> Code {
        match self {
            CorpusError::Io { .. } => codes::corpus::CORPUS_IO_ERROR,
            CorpusError::Parse { .. } => codes::corpus::CORPUS_PARSE_ERROR,
            CorpusError::InvalidLocationKey { .. } => codes::corpus::INVALID_LOCATION_KEY,
            CorpusError::TooLarge { .. } => codes::corpus::CORPUS_TOO_LARGE,
            CorpusError::MissingWord { .. } => codes::corpus::MISSING_WORD,
        }
    }
}

/// Counts the reference resolver needs
pub trait CorpusMetadata {
    fn chapter_count(&self) -> u32;

    /// `None` when the chapter does not exist
    fn verse_count(&self, chapter: u32) -> Option<u32>;

    /// `None` when the verse does not exist
    fn word_count(&self, chapter: u32, verse: u32) -> Option<u32>;
}

pub trait Corpus: CorpusMetadata + Send + Sync {
    fn word_text(&self, location: Location) -> Option<&str>;

    /// Word text, or `MissingWord` for a gap in the corpus
    fn require_word(&self, location: Location) -> CorpusResult<&str> {
        self.word_text(location)
            .ok_or(CorpusError::MissingWord { location })
    }

    /// Whether `location` is the last word of its verse
    fn is_verse_end(&self, location: Location) -> bool {
        self.word_count(location.chapter, location.verse) == Some(location.word)
    }
}
