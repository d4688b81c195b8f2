//! Phoneme string rendering

use crate::word::Word;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the rendered text breaks lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineMode {
    #[default]
    Verse,
    Word,
}

impl NewlineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewlineMode::Verse => "verse",
            NewlineMode::Word => "word",
        }
    }
}

impl fmt::Display for NewlineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewlineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verse" => Ok(NewlineMode::Verse),
            "word" => Ok(NewlineMode::Word),
            other => Err(format!("newline mode must be 'verse' or 'word', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub phoneme_sep: String,
    pub word_sep: String,
    pub verse_sep: String,
}

impl Default for RenderConfig {
    /// Phonemes run together, words split by spaces, segments by lines
    fn default() -> Self {
        Self::new("", " ", "\n")
    }
}

impl RenderConfig {
    pub fn new(phoneme_sep: &str, word_sep: &str, verse_sep: &str) -> Self {
        Self {
            phoneme_sep: phoneme_sep.to_string(),
            word_sep: word_sep.to_string(),
            verse_sep: verse_sep.to_string(),
        }
    }

    pub fn for_newline_mode(mode: NewlineMode) -> Self {
        match mode {
            NewlineMode::Verse => Self::new(" ", " ", "\n"),
            NewlineMode::Word => Self::new(" ", "\n", "\n"),
        }
    }

    /// Word separator, falling back to the phoneme separator when empty
    pub fn effective_word_sep(&self) -> &str {
        if self.word_sep.is_empty() {
            &self.phoneme_sep
        } else {
            &self.word_sep
        }
    }

    /// Verse separator, falling back to the word then phoneme separator
    pub fn effective_verse_sep(&self) -> &str {
        if self.verse_sep.is_empty() {
            self.effective_word_sep()
        } else {
            &self.verse_sep
        }
    }
}

/// Boundary strength between two emitted words
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Break {
    None,
    Word,
    Segment,
}

/// One separator per gap between sounded words; a segment boundary anywhere
/// in the gap selects the verse separator
pub fn render(words: &[Word], config: &RenderConfig) -> String {
    let mut out = String::new();
    let mut pending = Break::None;
    let mut emitted = false;

    for word in words {
        if !word.phonemes.is_empty() {
            if emitted {
                let sep = match pending {
                    Break::Segment => config.effective_verse_sep(),
                    _ => config.effective_word_sep(),
                };
                out.push_str(sep);
            }

            out.push_str(&word.phonemes.join(&config.phoneme_sep));
            emitted = true;
            pending = Break::None;
        }

        let here = if word.boundary.segment {
            Break::Segment
        } else {
            Break::Word
        };
        pending = pending.max(here);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::Boundary;
    use crate::location::Location;
    use crate::symbols::ClassifiedWord;

    fn word(verse: u32, index: u32, phonemes: &[&str], segment: bool) -> Word {
        let mut word = Word::new(
            Location::new(1, verse, index),
            "",
            ClassifiedWord::default(),
            segment,
        );
        word.boundary = Boundary {
            segment,
            ..word.boundary
        };
        word.phonemes = phonemes.iter().map(|p| p.to_string()).collect();
        word
    }

    fn sample() -> Vec<Word> {
        vec![
            word(1, 1, &["q", "u", "l"], false),
            word(1, 2, &["h", "u", "w", "a"], true),
            word(2, 1, &["ʔ", "a"], true),
        ]
    }

    #[test]
    fn test_default_render() {
        assert_eq!(render(&sample(), &RenderConfig::default()), "qul huwa\nʔa");
    }

    #[test]
    fn test_newline_modes() {
        assert_eq!(
            render(&sample(), &RenderConfig::for_newline_mode(NewlineMode::Verse)),
            "q u l h u w a\nʔ a"
        );
        assert_eq!(
            render(&sample(), &RenderConfig::for_newline_mode(NewlineMode::Word)),
            "q u l\nh u w a\nʔ a"
        );
    }

    #[test]
    fn test_separator_fallback() {
        let config = RenderConfig::new("-", "", "");
        assert_eq!(render(&sample(), &config), "q-u-l-h-u-w-a-ʔ-a");

        let config = RenderConfig::new("", "|", "");
        assert_eq!(render(&sample(), &config), "qul|huwa|ʔa");
    }

    #[test]
    fn test_empty_words_do_not_double_separators() {
        let mut words = sample();
        words.insert(1, word(1, 2, &[], false));
        assert_eq!(render(&words, &RenderConfig::default()), "qul huwa\nʔa");
    }

    #[test]
    fn test_segment_carried_over_empty_word() {
        let words = vec![
            word(1, 1, &["a"], false),
            word(1, 2, &[], true),
            word(2, 1, &["b"], true),
        ];
        assert_eq!(render(&words, &RenderConfig::default()), "a\nb");
    }

    #[test]
    fn test_newline_mode_parse() {
        assert_eq!("Word".parse::<NewlineMode>().unwrap(), NewlineMode::Word);
        assert!("line".parse::<NewlineMode>().is_err());
        assert_eq!(NewlineMode::default().to_string(), "verse");
    }
}
