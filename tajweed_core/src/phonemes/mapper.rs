//! Symbol clusters → baseline letter units

use crate::symbols::{DiacriticKind, Symbol};
use crate::tables::{LetterKind, PhonemeTable, SymbolTable, TableResult};

/// One letter cluster with its baseline phonemes
///
/// The rule engine rewrites `consonant`, `coda` and `vowel`; the rest
/// describes the cluster as written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LetterUnit {
    pub grapheme: char,
    pub kind: LetterKind,
    pub diacritic: Option<DiacriticKind>,
    pub geminated: bool,
    /// Long vowel the cluster's extension produces
    pub extended: Option<String>,
    /// Written but not pronounced
    pub silent: bool,
    /// Undoubled consonant phoneme
    pub consonant: Option<String>,
    pub coda: Vec<String>,
    pub vowel: Vec<String>,
    /// The last `vowel` element is the nunation nasal
    pub tanween: bool,
    /// Consumed by a merge; no rule may match it again
    pub locked: bool,
}

impl LetterUnit {
    /// Emitted tokens: consonant (doubled when geminated), coda, vowel
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(1 + self.coda.len() + self.vowel.len());

        if let Some(consonant) = self.consonant.as_ref().filter(|c| !c.is_empty()) {
            if self.geminated {
                tokens.push(consonant.repeat(2));
            } else {
                tokens.push(consonant.clone());
            }
        }

        tokens.extend(self.coda.iter().filter(|t| !t.is_empty()).cloned());
        tokens.extend(self.vowel.iter().filter(|t| !t.is_empty()).cloned());
        tokens
    }
}

/// Letter plus the marks bound to it, before lookup
#[derive(Default)]
struct Cluster {
    grapheme: char,
    geminated: bool,
    diacritic: Option<DiacriticKind>,
    extensions: Vec<char>,
    silenced: bool,
}

pub struct BaseMapper<'a> {
    symbols: &'a SymbolTable,
    phonemes: &'a PhonemeTable,
}

impl<'a> BaseMapper<'a> {
    pub fn new(symbols: &'a SymbolTable, phonemes: &'a PhonemeTable) -> Self {
        Self { symbols, phonemes }
    }

    /// One unit per Letter cluster; `Other` and stop marks produce nothing
    pub fn map_word(&self, symbols: &[Symbol]) -> TableResult<Vec<LetterUnit>> {
        self.clusters(symbols)
            .into_iter()
            .map(|cluster| self.map_cluster(cluster))
            .collect()
    }

    fn clusters(&self, symbols: &[Symbol]) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = Vec::new();

        for symbol in symbols {
            match symbol {
                Symbol::Letter {
                    grapheme,
                    is_geminated,
                } => clusters.push(Cluster {
                    grapheme: *grapheme,
                    geminated: *is_geminated,
                    ..Cluster::default()
                }),
                Symbol::Diacritic { kind } => {
                    if let Some(cluster) = clusters.last_mut() {
                        cluster.diacritic = Some(*kind);
                    }
                }
                Symbol::Extension { grapheme } => {
                    if let Some(cluster) = clusters.last_mut() {
                        cluster.extensions.push(*grapheme);
                    }
                }
                Symbol::Other { raw } if self.symbols.is_silent_mark(*raw) => {
                    if let Some(cluster) = clusters.last_mut() {
                        cluster.silenced = true;
                    }
                }
                Symbol::Other { .. } | Symbol::StopMark(_) => {}
            }
        }

        clusters
    }

    fn map_cluster(&self, cluster: Cluster) -> TableResult<LetterUnit> {
        let base = self
            .phonemes
            .lookup(cluster.grapheme, cluster.diacritic, cluster.geminated)?;
        let kind = self.phonemes.kind(cluster.grapheme);
        // an override may spell nunation without the nasal token
        let tanween = cluster.diacritic.map(|d| d.is_tanween()).unwrap_or(false)
            && base.vowel.last().map(String::as_str) == Some(self.phonemes.tanween_nasal());
        let extended = self.extension_vowel(&cluster)?;

        let mut unit = LetterUnit {
            grapheme: cluster.grapheme,
            kind,
            diacritic: cluster.diacritic,
            geminated: base.geminated,
            extended: extended.clone(),
            tanween,
            ..LetterUnit::default()
        };

        if cluster.silenced {
            unit.silent = true;
            unit.geminated = false;
            return Ok(unit);
        }

        unit.vowel = match (&extended, tanween) {
            (Some(long), false) => vec![long.clone()],
            _ => base.vowel,
        };

        let unmarked = cluster.diacritic.is_none() && !unit.geminated && extended.is_none();
        if unmarked && unit.vowel.is_empty() {
            // Vowel carriers are silent; other bare consonants are assimilated
            unit.silent = kind.is_vowel_carrier();
            unit.consonant = None;
        } else {
            unit.consonant = base.consonant;
        }

        Ok(unit)
    }

    fn extension_vowel(&self, cluster: &Cluster) -> TableResult<Option<String>> {
        let Some(first) = cluster.extensions.first() else {
            return Ok(None);
        };

        match cluster.diacritic {
            Some(kind) if kind != DiacriticKind::Sukun => {
                let short = self.phonemes.vowel(kind.short_form())?;
                Ok(Some(self.phonemes.lengthen(short)))
            }
            _ => Ok(self.symbols.extension_vowel(*first).map(str::to_string)),
        }
    }
}
