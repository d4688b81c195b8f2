//! In-memory corpus loaded from word-by-word JSON
//!
//! ```json
//! { "1:1:1": { "text": "بِسْمِ" }, "1:1:2": { "text": ["ٱللَّهِ"] } }
//! ```
//!
//! Text may be a string or a list of fragments; `<rule ...>` annotation tags
//! are stripped on load.

use super::{Corpus, CorpusError, CorpusMetadata, CorpusResult};
use crate::config::compile_time::corpus::MAX_CORPUS_FILE_SIZE;
use crate::location::Location;
use crate::log_success;
use crate::logging::codes;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

const RULE_TAG_PATTERN: &str = r"</?rule[^>]*?>";

static RULE_TAG: OnceLock<Result<Regex, String>> = OnceLock::new();

fn strip_rule_tags(text: &str) -> CorpusResult<String> {
    let pattern = RULE_TAG
        .get_or_init(|| Regex::new(RULE_TAG_PATTERN).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|message| CorpusError::Parse {
            message: message.clone(),
        })?;
    Ok(pattern.replace_all(text, "").into_owned())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Whole(String),
    Fragments(Vec<String>),
}

#[derive(Deserialize)]
struct RawEntry {
    text: RawText,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    words: BTreeMap<Location, String>,
    /// chapter → verse → highest word index
    counts: BTreeMap<u32, BTreeMap<u32, u32>>,
}

impl MemoryCorpus {
    /// Build from already-clean (location, text) pairs
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = (Location, S)>,
        S: Into<String>,
    {
        let mut corpus = Self::default();
        for (location, text) in words {
            corpus.insert(location, text.into());
        }
        corpus
    }

    /// Words of one verse, numbered from 1
    pub fn with_verse(mut self, chapter: u32, verse: u32, words: &[&str]) -> Self {
        for (i, text) in words.iter().enumerate() {
            self.insert(Location::new(chapter, verse, i as u32 + 1), text.to_string());
        }
        self
    }

    pub fn from_json_str(json: &str) -> CorpusResult<Self> {
        let raw: HashMap<String, RawEntry> =
            serde_json::from_str(json).map_err(|e| CorpusError::Parse {
                message: e.to_string(),
            })?;

        let mut corpus = Self::default();
        for (key, entry) in raw {
            let location: Location = key
                .parse()
                .map_err(|_| CorpusError::InvalidLocationKey { key: key.clone() })?;

            let text = match entry.text {
                RawText::Whole(text) => text,
                RawText::Fragments(parts) => parts.concat(),
            };
            corpus.insert(location, strip_rule_tags(&text)?);
        }

        Ok(corpus)
    }

    pub fn load(path: &Path) -> CorpusResult<Self> {
        let io_error = |e: std::io::Error| CorpusError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let size = fs::metadata(path).map_err(io_error)?.len();
        if size > MAX_CORPUS_FILE_SIZE {
            return Err(CorpusError::TooLarge {
                path: path.display().to_string(),
                size,
            });
        }

        let content = fs::read_to_string(path).map_err(io_error)?;
        let corpus = Self::from_json_str(&content)?;

        log_success!(codes::success::CORPUS_LOADED, "Corpus loaded",
            "path" => path.display(),
            "words" => corpus.len(),
            "chapters" => corpus.chapter_count()
        );

        Ok(corpus)
    }

    fn insert(&mut self, location: Location, text: String) {
        let highest = self
            .counts
            .entry(location.chapter)
            .or_default()
            .entry(location.verse)
            .or_insert(0);
        *highest = (*highest).max(location.word);
        self.words.insert(location, text);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl CorpusMetadata for MemoryCorpus {
    fn chapter_count(&self) -> u32 {
        self.counts.keys().next_back().copied().unwrap_or(0)
    }

    fn verse_count(&self, chapter: u32) -> Option<u32> {
        self.counts
            .get(&chapter)
            .and_then(|verses| verses.keys().next_back().copied())
    }

    fn word_count(&self, chapter: u32, verse: u32) -> Option<u32> {
        self.counts
            .get(&chapter)
            .and_then(|verses| verses.get(&verse).copied())
    }
}

impl Corpus for MemoryCorpus {
    fn word_text(&self, location: Location) -> Option<&str> {
        self.words.get(&location).map(String::as_str)
    }
}
