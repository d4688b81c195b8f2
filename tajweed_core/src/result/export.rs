//! JSON and CSV export of a phonemize result

use super::PhonemizeResult;
use crate::logging::{codes, Code};
use crate::word::Word;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Row granularity of an export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportSplit {
    #[default]
    Word,
    Verse,
    Both,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => f.write_str("json"),
            ExportFormat::Csv => f.write_str("csv"),
        }
    }
}

impl fmt::Display for ExportSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportSplit::Word => f.write_str("word"),
            ExportSplit::Verse => f.write_str("verse"),
            ExportSplit::Both => f.write_str("both"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

impl FromStr for ExportSplit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "word" => Ok(ExportSplit::Word),
            "verse" => Ok(ExportSplit::Verse),
            "both" => Ok(ExportSplit::Both),
            other => Err(format!("unknown export split '{}'", other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{format} export does not support the '{split}' split")]
    UnsupportedSplit {
        format: ExportFormat,
        split: ExportSplit,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExportError {
    pub fn error_code(&self) -> Code {
        match self {
            ExportError::UnsupportedSplit { .. } => codes::export::UNSUPPORTED_SPLIT,
            ExportError::Serialization(_) => codes::export::SERIALIZATION_ERROR,
        }
    }
}

pub fn validate_export(format: ExportFormat, split: ExportSplit) -> Result<(), ExportError> {
    match (format, split) {
        (ExportFormat::Csv, ExportSplit::Both) => Err(ExportError::UnsupportedSplit { format, split }),
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize)]
struct WordRow<'a> {
    location: String,
    text: &'a str,
    phonemes: &'a [String],
}

#[derive(Debug, Serialize)]
struct VerseRow<'a> {
    verse: String,
    text: String,
    phonemes: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct VerseWithWords<'a> {
    verse: String,
    text: String,
    words: Vec<WordRow<'a>>,
}

impl<'a> From<&'a Word> for WordRow<'a> {
    fn from(word: &'a Word) -> Self {
        Self {
            location: word.location.to_string(),
            text: &word.raw_text,
            phonemes: &word.phonemes,
        }
    }
}

fn word_rows(result: &PhonemizeResult) -> Vec<WordRow<'_>> {
    result.words.iter().map(WordRow::from).collect()
}

fn verse_label(words: &[Word]) -> String {
    let first = words[0].location;
    format!("{}:{}", first.chapter, first.verse)
}

fn verse_text(words: &[Word]) -> String {
    words
        .iter()
        .map(|w| w.raw_text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn verse_phonemes(words: &[Word]) -> Vec<&str> {
    words
        .iter()
        .flat_map(|w| w.phonemes.iter().map(String::as_str))
        .collect()
}

fn verse_rows(result: &PhonemizeResult) -> Vec<VerseRow<'_>> {
    result
        .verses()
        .into_iter()
        .map(|words| VerseRow {
            verse: verse_label(words),
            text: verse_text(words),
            phonemes: verse_phonemes(words),
        })
        .collect()
}

fn nested_rows(result: &PhonemizeResult) -> Vec<VerseWithWords<'_>> {
    result
        .verses()
        .into_iter()
        .map(|words| VerseWithWords {
            verse: verse_label(words),
            text: verse_text(words),
            words: words.iter().map(WordRow::from).collect(),
        })
        .collect()
}

/// RFC 4180 field quoting
fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(fields: [&str; 3]) -> String {
    let quoted: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    format!("{}\r\n", quoted.join(","))
}

pub fn export(
    result: &PhonemizeResult,
    format: ExportFormat,
    split: ExportSplit,
) -> Result<String, ExportError> {
    validate_export(format, split)?;

    let output = match (format, split) {
        (ExportFormat::Json, ExportSplit::Word) => serde_json::to_string_pretty(&word_rows(result))?,
        (ExportFormat::Json, ExportSplit::Verse) => serde_json::to_string_pretty(&verse_rows(result))?,
        (ExportFormat::Json, ExportSplit::Both) => serde_json::to_string_pretty(&nested_rows(result))?,
        (ExportFormat::Csv, ExportSplit::Word) => {
            let mut out = csv_line(["location", "text", "phonemes"]);
            for row in word_rows(result) {
                let phonemes = row.phonemes.join(" ");
                out.push_str(&csv_line([&row.location, row.text, &phonemes]));
            }
            out
        }
        (ExportFormat::Csv, _) => {
            let mut out = csv_line(["verse", "text", "phonemes"]);
            for row in verse_rows(result) {
                let phonemes = row.phonemes.join(" ");
                out.push_str(&csv_line([&row.verse, &row.text, &phonemes]));
            }
            out
        }
    };

    crate::log_success!(codes::success::EXPORT_COMPLETE, "Export complete",
        "reference" => result.reference,
        "format" => format,
        "split" => split,
        "bytes" => output.len()
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::result::RenderConfig;
    use crate::symbols::ClassifiedWord;
    use assert_matches::assert_matches;

    fn word(verse: u32, index: u32, text: &str, phonemes: &[&str]) -> Word {
        let mut word = Word::new(
            Location::new(112, verse, index),
            text,
            ClassifiedWord::default(),
            false,
        );
        word.phonemes = phonemes.iter().map(|p| p.to_string()).collect();
        word
    }

    fn sample() -> PhonemizeResult {
        PhonemizeResult {
            reference: "112:1 - 112:2".to_string(),
            text: String::new(),
            words: vec![
                word(1, 1, "قُلْ", &["q", "u", "l"]),
                word(1, 2, "هُوَ", &["h", "u", "w", "a"]),
                word(2, 1, "ٱللَّهُ", &["lˤlˤ", "a:", "h"]),
            ],
            render: RenderConfig::default(),
        }
    }

    #[test]
    fn test_csv_both_is_rejected() {
        assert_matches!(
            validate_export(ExportFormat::Csv, ExportSplit::Both),
            Err(ExportError::UnsupportedSplit { .. })
        );
        assert!(validate_export(ExportFormat::Json, ExportSplit::Both).is_ok());
        assert_matches!(
            export(&sample(), ExportFormat::Csv, ExportSplit::Both),
            Err(ExportError::UnsupportedSplit { .. })
        );
    }

    #[test]
    fn test_csv_word_rows() {
        let csv = export(&sample(), ExportFormat::Csv, ExportSplit::Word).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "location,text,phonemes");
        assert_eq!(lines[1], "112:1:1,قُلْ,q u l");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_csv_verse_rows() {
        let csv = export(&sample(), ExportFormat::Csv, ExportSplit::Verse).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "verse,text,phonemes");
        assert_eq!(lines[1], "112:1,قُلْ هُوَ,q u l h u w a");
        assert_eq!(lines[2], "112:2,ٱللَّهُ,lˤlˤ a: h");
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"x\""), "\"say \"\"x\"\"\"");
    }

    #[test]
    fn test_json_both_nests_words() {
        let json = export(&sample(), ExportFormat::Json, ExportSplit::Both).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["verse"], "112:1");
        assert_eq!(value[0]["words"][1]["location"], "112:1:2");
        assert_eq!(value[1]["words"][0]["phonemes"][1], "a:");
    }

    #[test]
    fn test_json_verse_flattens_phonemes() {
        let json = export(&sample(), ExportFormat::Json, ExportSplit::Verse).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["phonemes"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("both".parse::<ExportSplit>().unwrap(), ExportSplit::Both);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
