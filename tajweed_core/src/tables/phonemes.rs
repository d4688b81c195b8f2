//! Letter × diacritic × gemination phoneme lookup

use super::error::{TableError, TableResult};
use super::symbols::{parse_diacritic_kind, single_char, SymbolTable};
use crate::config::compile_time::tables::{MAX_LETTER_ENTRIES, MAX_OVERRIDE_ENTRIES};
use crate::symbols::DiacriticKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

const TABLE: &str = "phonemes";

/// Phonological role of a letter, consulted by the mapper and by rule triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterKind {
    #[default]
    Consonant,
    Hamza,
    HamzaWasl,
    Alef,
    AlefMaksura,
    TaaMarbuta,
}

impl LetterKind {
    /// Vowel letters that are silent when they carry no mark
    pub fn is_vowel_carrier(&self) -> bool {
        matches!(
            self,
            LetterKind::Alef | LetterKind::AlefMaksura | LetterKind::HamzaWasl
        )
    }
}

fn default_geminates() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LetterEntry {
    #[serde(default)]
    pub phoneme: Option<String>,
    #[serde(default)]
    pub kind: LetterKind,
    #[serde(default = "default_geminates")]
    pub geminates: bool,
    /// Vowel the letter carries when written without a diacritic (madda alef)
    #[serde(default)]
    pub inherent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOverride {
    letter: char,
    #[serde(default)]
    diacritic: Option<String>,
    #[serde(default)]
    geminated: bool,
    #[serde(default)]
    consonant: Option<String>,
    #[serde(default)]
    vowel: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPhonemeTable {
    tanween_nasal: String,
    long_suffix: String,
    vowels: BTreeMap<String, String>,
    letters: BTreeMap<String, LetterEntry>,
    #[serde(default)]
    overrides: Vec<RawOverride>,
}

/// Baseline tokens for one letter cluster
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BaseTokens {
    /// Undoubled consonant phoneme
    pub consonant: Option<String>,
    /// Whether the consonant is written doubled
    pub geminated: bool,
    pub vowel: Vec<String>,
}

type OverrideKey = (char, Option<DiacriticKind>, bool);

#[derive(Debug, Clone)]
pub struct PhonemeTable {
    letters: HashMap<char, LetterEntry>,
    vowels: HashMap<DiacriticKind, String>,
    overrides: HashMap<OverrideKey, BaseTokens>,
    tanween_nasal: String,
    long_suffix: String,
}

impl PhonemeTable {
    pub fn from_toml(source: &str) -> TableResult<Self> {
        let raw: RawPhonemeTable =
            toml::from_str(source).map_err(|e| TableError::parse(TABLE, e))?;

        if raw.letters.len() > MAX_LETTER_ENTRIES {
            return Err(TableError::invalid_entry(
                TABLE,
                "letters",
                format!("{} letters (max {})", raw.letters.len(), MAX_LETTER_ENTRIES),
            ));
        }
        if raw.overrides.len() > MAX_OVERRIDE_ENTRIES {
            return Err(TableError::invalid_entry(
                TABLE,
                "overrides",
                format!("{} overrides (max {})", raw.overrides.len(), MAX_OVERRIDE_ENTRIES),
            ));
        }

        let mut vowels = HashMap::new();
        for (name, phoneme) in raw.vowels {
            let kind = parse_diacritic_kind(&name)
                .ok_or_else(|| TableError::invalid_entry(TABLE, name.as_str(), "unknown diacritic kind"))?;
            vowels.insert(kind, phoneme);
        }

        let mut letters = HashMap::new();
        for (key, entry) in raw.letters {
            letters.insert(single_char(TABLE, &key)?, entry);
        }

        let mut overrides = HashMap::new();
        for entry in raw.overrides {
            let diacritic = match entry.diacritic.as_deref() {
                None | Some("none") => None,
                Some(name) => Some(parse_diacritic_kind(name).ok_or_else(|| {
                    TableError::invalid_entry(TABLE, name, "unknown diacritic kind in override")
                })?),
            };
            let key = (entry.letter, diacritic, entry.geminated);
            let tokens = BaseTokens {
                consonant: entry.consonant,
                geminated: false,
                vowel: entry.vowel,
            };
            if overrides.insert(key, tokens).is_some() {
                return Err(TableError::invalid_entry(
                    TABLE,
                    entry.letter.to_string(),
                    "duplicate override",
                ));
            }
        }

        Ok(Self {
            letters,
            vowels,
            overrides,
            tanween_nasal: raw.tanween_nasal,
            long_suffix: raw.long_suffix,
        })
    }

    /// Every classified letter and every diacritic kind must have a mapping
    pub fn check_coverage(&self, symbols: &SymbolTable) -> TableResult<()> {
        for letter in symbols.letters() {
            if !self.letters.contains_key(letter) {
                return Err(TableError::missing_mapping(format!(
                    "letter '{}' (U+{:04X})",
                    letter, *letter as u32
                )));
            }
        }

        for kind in DiacriticKind::ALL {
            if !self.vowels.contains_key(&kind) {
                return Err(TableError::missing_mapping(format!("diacritic '{}'", kind)));
            }
        }

        for (letter, _, _) in self.overrides.keys() {
            if !symbols.is_letter(*letter) {
                return Err(TableError::invalid_entry(
                    TABLE,
                    letter.to_string(),
                    "override for a letter the classifier does not know",
                ));
            }
        }

        Ok(())
    }

    /// Baseline tokens for a letter cluster; overrides take precedence
    pub fn lookup(
        &self,
        letter: char,
        diacritic: Option<DiacriticKind>,
        geminated: bool,
    ) -> TableResult<BaseTokens> {
        if let Some(tokens) = self.overrides.get(&(letter, diacritic, geminated)) {
            return Ok(tokens.clone());
        }

        let entry = self.entry(letter).ok_or_else(|| {
            TableError::missing_mapping(format!("letter '{}' (U+{:04X})", letter, letter as u32))
        })?;

        let vowel = match diacritic {
            Some(kind) => {
                let short = self.vowel(kind)?;
                let mut vowel = Vec::new();
                if !short.is_empty() {
                    vowel.push(short.to_string());
                }
                if kind.is_tanween() {
                    vowel.push(self.tanween_nasal.clone());
                }
                vowel
            }
            None => entry.inherent.iter().cloned().collect(),
        };

        Ok(BaseTokens {
            consonant: entry.phoneme.clone(),
            geminated: geminated && entry.geminates,
            vowel,
        })
    }

    pub fn entry(&self, letter: char) -> Option<&LetterEntry> {
        self.letters.get(&letter)
    }

    pub fn kind(&self, letter: char) -> LetterKind {
        self.entry(letter).map(|e| e.kind).unwrap_or_default()
    }

    pub fn vowel(&self, kind: DiacriticKind) -> TableResult<&str> {
        self.vowels
            .get(&kind)
            .map(String::as_str)
            .ok_or_else(|| TableError::missing_mapping(format!("diacritic '{}'", kind)))
    }

    pub fn tanween_nasal(&self) -> &str {
        &self.tanween_nasal
    }

    /// Long form of a short vowel (`a` -> `a:`)
    pub fn lengthen(&self, vowel: &str) -> String {
        format!("{}{}", vowel, self.long_suffix)
    }

    pub fn letter_count(&self) -> usize {
        self.letters.len()
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const TABLE_SOURCE: &str = r#"
tanween_nasal = "n"
long_suffix = ":"

[vowels]
fatha = "a"
damma = "u"
kasra = "i"
fathatan = "a"
dammatan = "u"
kasratan = "i"
sukun = ""

[letters]
"د" = { phoneme = "d" }
"ا" = { kind = "alef", geminates = false }
"آ" = { phoneme = "ʔ", kind = "hamza", inherent = "a:" }
"ي" = { phoneme = "j", geminates = false }

[[overrides]]
letter = "د"
diacritic = "kasra"
geminated = true
consonant = "dd"
vowel = ["i:"]
"#;

    fn table() -> PhonemeTable {
        PhonemeTable::from_toml(TABLE_SOURCE).unwrap()
    }

    #[test]
    fn test_composed_lookup() {
        let tokens = table().lookup('د', Some(DiacriticKind::Fatha), false).unwrap();
        assert_eq!(tokens.consonant.as_deref(), Some("d"));
        assert_eq!(tokens.vowel, vec!["a"]);
        assert!(!tokens.geminated);
    }

    #[test]
    fn test_gemination_doubles_token() {
        let tokens = table().lookup('د', Some(DiacriticKind::Damma), true).unwrap();
        assert!(tokens.geminated);
        assert_eq!(tokens.consonant.as_deref(), Some("d"));
    }

    #[test]
    fn test_non_geminating_letter_never_doubles() {
        let tokens = table().lookup('ي', Some(DiacriticKind::Fatha), true).unwrap();
        assert!(!tokens.geminated);
        assert_eq!(tokens.consonant.as_deref(), Some("j"));
    }

    #[test]
    fn test_tanween_and_sukun() {
        let table = table();
        let tanween = table.lookup('د', Some(DiacriticKind::Dammatan), false).unwrap();
        assert_eq!(tanween.vowel, vec!["u", "n"]);
        assert_eq!(table.tanween_nasal(), "n");

        let sukun = table.lookup('د', Some(DiacriticKind::Sukun), false).unwrap();
        assert!(sukun.vowel.is_empty());
    }

    #[test]
    fn test_inherent_vowel_without_diacritic() {
        let tokens = table().lookup('آ', None, false).unwrap();
        assert_eq!(tokens.consonant.as_deref(), Some("ʔ"));
        assert_eq!(tokens.vowel, vec!["a:"]);
    }

    #[test]
    fn test_override_takes_precedence() {
        let tokens = table().lookup('د', Some(DiacriticKind::Kasra), true).unwrap();
        assert_eq!(tokens.consonant.as_deref(), Some("dd"));
        assert_eq!(tokens.vowel, vec!["i:"]);

        let plain = table().lookup('د', Some(DiacriticKind::Kasra), false).unwrap();
        assert_eq!(plain.vowel, vec!["i"]);
    }

    #[test]
    fn test_unknown_letter_is_missing_mapping() {
        assert_matches!(
            table().lookup('ب', None, false),
            Err(TableError::MissingMapping { .. })
        );
    }

    #[test]
    fn test_lengthen() {
        assert_eq!(table().lengthen("u"), "u:");
    }

    #[test]
    fn test_missing_vowel_fails_coverage() {
        let source = TABLE_SOURCE.replace("kasratan = \"i\"\n", "");
        let table = PhonemeTable::from_toml(&source).unwrap();
        let symbols = SymbolTable::from_toml(
            r#"
tatweel = "ـ"
shaddah = "ّ"
letters = ["د"]
[diacritics]
fatha = ["َ"]
"#,
        )
        .unwrap();
        assert_matches!(
            table.check_coverage(&symbols),
            Err(TableError::MissingMapping { .. })
        );
    }

    #[test]
    fn test_missing_letter_fails_coverage() {
        let symbols = SymbolTable::from_toml(
            r#"
tatweel = "ـ"
shaddah = "ّ"
letters = ["د", "ب"]
[diacritics]
fatha = ["َ"]
"#,
        )
        .unwrap();
        assert_matches!(
            table().check_coverage(&symbols),
            Err(TableError::MissingMapping { what }) if what.contains('ب')
        );
    }
}
