//! Letter and mark classification table

use super::error::{TableError, TableResult};
use crate::config::compile_time::tables::MAX_LETTER_ENTRIES;
use crate::symbols::DiacriticKind;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

const TABLE: &str = "symbols";

/// Key of the implicit verse-end stop
pub const VERSE_STOP_KEY: &str = "verse";

/// What a single codepoint means to the classifier
#[derive(Debug, Clone, PartialEq)]
pub enum CharClass {
    Letter,
    Diacritic(DiacriticKind),
    Shaddah,
    Tatweel,
    /// Small lengthening mark (dagger alef, small waw, small yaa)
    ExtensionMark,
    /// Mark that silences the letter before it
    SilentMark,
    Stop(String),
}

#[derive(Debug, Deserialize)]
struct RawSymbolTable {
    tatweel: char,
    shaddah: char,
    #[serde(default)]
    silent_marks: Vec<char>,
    diacritics: BTreeMap<String, Vec<char>>,
    #[serde(default)]
    extension_marks: BTreeMap<String, String>,
    #[serde(default)]
    long_vowel_letters: BTreeMap<String, Vec<String>>,
    letters: Vec<char>,
    #[serde(default)]
    stops: BTreeMap<String, char>,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    classes: HashMap<char, CharClass>,
    letters: Vec<char>,
    long_vowels: HashMap<char, Vec<DiacriticKind>>,
    extension_vowels: HashMap<char, String>,
    stops: Vec<(String, char)>,
}

pub(crate) fn single_char(table: &str, key: &str) -> TableResult<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(TableError::invalid_entry(
            table,
            key,
            "expected exactly one codepoint",
        )),
    }
}

pub(crate) fn parse_diacritic_kind(name: &str) -> Option<DiacriticKind> {
    DiacriticKind::ALL.into_iter().find(|k| k.as_str() == name)
}

impl SymbolTable {
    pub fn from_toml(source: &str) -> TableResult<Self> {
        let raw: RawSymbolTable = toml::from_str(source).map_err(|e| TableError::parse(TABLE, e))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSymbolTable) -> TableResult<Self> {
        if raw.letters.len() > MAX_LETTER_ENTRIES {
            return Err(TableError::invalid_entry(
                TABLE,
                "letters",
                format!("{} letters (max {})", raw.letters.len(), MAX_LETTER_ENTRIES),
            ));
        }

        let mut classes = HashMap::new();
        let mut insert = |c: char, class: CharClass| -> TableResult<()> {
            match classes.insert(c, class) {
                Some(_) => Err(TableError::invalid_entry(
                    TABLE,
                    format!("U+{:04X}", c as u32),
                    "codepoint classified twice",
                )),
                None => Ok(()),
            }
        };

        insert(raw.tatweel, CharClass::Tatweel)?;
        insert(raw.shaddah, CharClass::Shaddah)?;
        for c in &raw.silent_marks {
            insert(*c, CharClass::SilentMark)?;
        }

        for (name, glyphs) in &raw.diacritics {
            let kind = parse_diacritic_kind(name)
                .ok_or_else(|| TableError::invalid_entry(TABLE, name.as_str(), "unknown diacritic kind"))?;
            for c in glyphs {
                insert(*c, CharClass::Diacritic(kind))?;
            }
        }

        let mut extension_vowels = HashMap::new();
        for (key, vowel) in &raw.extension_marks {
            let c = single_char(TABLE, key)?;
            insert(c, CharClass::ExtensionMark)?;
            extension_vowels.insert(c, vowel.clone());
        }

        for c in &raw.letters {
            insert(*c, CharClass::Letter)?;
        }

        let mut stops = Vec::new();
        for (key, glyph) in &raw.stops {
            if key == VERSE_STOP_KEY {
                return Err(TableError::invalid_entry(
                    TABLE,
                    key.as_str(),
                    "the verse stop is implicit and has no glyph",
                ));
            }
            insert(*glyph, CharClass::Stop(key.clone()))?;
            stops.push((key.clone(), *glyph));
        }

        let mut long_vowels = HashMap::new();
        for (key, vowels) in &raw.long_vowel_letters {
            let c = single_char(TABLE, key)?;
            if !raw.letters.contains(&c) {
                return Err(TableError::invalid_entry(
                    TABLE,
                    key.as_str(),
                    "long-vowel letter is not in the letter list",
                ));
            }
            let kinds = vowels
                .iter()
                .map(|name| {
                    parse_diacritic_kind(name).ok_or_else(|| {
                        TableError::invalid_entry(TABLE, name.as_str(), "unknown diacritic kind")
                    })
                })
                .collect::<TableResult<Vec<_>>>()?;
            long_vowels.insert(c, kinds);
        }

        Ok(Self {
            classes,
            letters: raw.letters,
            long_vowels,
            extension_vowels,
            stops,
        })
    }

    pub fn classify_char(&self, c: char) -> Option<&CharClass> {
        self.classes.get(&c)
    }

    pub fn is_letter(&self, c: char) -> bool {
        matches!(self.classes.get(&c), Some(CharClass::Letter))
    }

    pub fn is_silent_mark(&self, c: char) -> bool {
        matches!(self.classes.get(&c), Some(CharClass::SilentMark))
    }

    /// True for diacritics, shaddah and silent marks
    pub fn is_mark(&self, c: char) -> bool {
        matches!(
            self.classes.get(&c),
            Some(CharClass::Diacritic(_)) | Some(CharClass::Shaddah) | Some(CharClass::SilentMark)
        )
    }

    /// Short vowels a long-vowel letter can extend
    pub fn long_vowel_compat(&self, c: char) -> Option<&[DiacriticKind]> {
        self.long_vowels.get(&c).map(Vec::as_slice)
    }

    /// Long vowel carried by a small extension mark
    pub fn extension_vowel(&self, c: char) -> Option<&str> {
        self.extension_vowels.get(&c).map(String::as_str)
    }

    /// Configured diacritic kinds
    pub fn diacritic_kinds(&self) -> Vec<DiacriticKind> {
        let mut kinds: Vec<DiacriticKind> = self
            .classes
            .values()
            .filter_map(|class| match class {
                CharClass::Diacritic(kind) => Some(*kind),
                _ => None,
            })
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// (key, glyph) for every configured stop, excluding the implicit verse stop
    pub fn stops(&self) -> &[(String, char)] {
        &self.stops
    }
}
