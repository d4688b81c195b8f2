//! Configuration tables
//!
//! Symbol classification, letter→phoneme mapping and the Tajweed rule set.
//! Tables are parsed and cross-checked once, then shared read-only behind
//! an `Arc` for the lifetime of the process.

pub mod error;
pub mod phonemes;
pub mod symbols;

pub use error::{TableError, TableResult};
pub use phonemes::{BaseTokens, LetterEntry, LetterKind, PhonemeTable};
pub use symbols::{CharClass, SymbolTable, VERSE_STOP_KEY};

use crate::config::compile_time::tables::MAX_TABLE_FILE_SIZE;
use crate::config::runtime::EnginePreferences;
use crate::logging::codes;
use crate::tajweed::RuleTable;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::Path;

pub const SYMBOLS_FILE: &str = "symbols.toml";
pub const PHONEMES_FILE: &str = "phonemes.toml";
pub const RULES_FILE: &str = "rules.toml";

const BUILTIN_SYMBOLS: &str = include_str!("../../resources/symbols.toml");
const BUILTIN_PHONEMES: &str = include_str!("../../resources/phonemes.toml");
const BUILTIN_RULES: &str = include_str!("../../resources/rules.toml");

/// The complete, cross-checked configuration
#[derive(Debug, Clone)]
pub struct Tables {
    pub symbols: SymbolTable,
    pub phonemes: PhonemeTable,
    pub rules: RuleTable,
}

impl Tables {
    /// Tables compiled into the binary from `resources/`
    pub fn builtin() -> TableResult<Self> {
        Self::from_strs(BUILTIN_SYMBOLS, BUILTIN_PHONEMES, BUILTIN_RULES)
    }

    pub fn from_strs(symbols: &str, phonemes: &str, rules: &str) -> TableResult<Self> {
        let tables = Self {
            symbols: SymbolTable::from_toml(symbols)?,
            phonemes: PhonemeTable::from_toml(phonemes)?,
            rules: RuleTable::from_toml(rules)?,
        };
        tables.check()?;
        Ok(tables)
    }

    /// Load `symbols.toml`, `phonemes.toml` and `rules.toml` from a directory
    pub fn load_dir(dir: &Path) -> TableResult<Self> {
        log_debug!("Loading tables", "dir" => dir.display());

        let result = (|| {
            let symbols = read_table(&dir.join(SYMBOLS_FILE))?;
            let phonemes = read_table(&dir.join(PHONEMES_FILE))?;
            let rules = read_table(&dir.join(RULES_FILE))?;
            Self::from_strs(&symbols, &phonemes, &rules)
        })();

        if let Err(e) = &result {
            log_error!(e.error_code(), "Table loading failed",
                "dir" => dir.display(),
                "error" => e
            );
        }

        result
    }

    fn check(&self) -> TableResult<()> {
        self.phonemes.check_coverage(&self.symbols)?;
        self.rules
            .check_letters(|c| self.symbols.is_letter(c))?;
        Ok(())
    }

    pub fn log_statistics(&self, preferences: &EnginePreferences) {
        if !preferences.log_table_statistics {
            return;
        }

        log_success!(codes::success::TABLES_LOADED, "Tables loaded",
            "letters" => self.symbols.letters().len(),
            "stops" => self.symbols.stops().len(),
            "phoneme_entries" => self.phonemes.letter_count(),
            "overrides" => self.phonemes.override_count(),
            "rules" => self.rules.rules().len(),
            "groups" => self.rules.group_count()
        );
    }
}

fn read_table(path: &Path) -> TableResult<String> {
    let io_error = |e: std::io::Error| TableError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let size = fs::metadata(path).map_err(io_error)?.len();
    if size > MAX_TABLE_FILE_SIZE {
        return Err(TableError::TooLarge {
            path: path.display().to_string(),
            size,
        });
    }

    fs::read_to_string(path).map_err(io_error)
}
