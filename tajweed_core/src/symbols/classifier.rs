//! Word text → symbol clusters

use super::symbol::{ClassifiedWord, DiacriticKind, StopMark, Symbol};
use crate::tables::{CharClass, SymbolTable};

/// State of the most recently opened letter cluster
struct OpenCluster {
    /// Index of the Letter symbol
    index: usize,
    vowel: Option<DiacriticKind>,
    extended: bool,
}

pub struct SymbolClassifier<'a> {
    table: &'a SymbolTable,
}

impl<'a> SymbolClassifier<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table }
    }

    /// Classify one word; never fails
    ///
    /// Unrecognised codepoints and marks with no open cluster become
    /// `Symbol::Other`. Tatweel and whitespace are dropped.
    pub fn classify(&self, raw_text: &str) -> ClassifiedWord {
        let chars: Vec<char> = raw_text.chars().collect();
        let mut word = ClassifiedWord::default();
        let mut cluster: Option<OpenCluster> = None;

        for (i, &ch) in chars.iter().enumerate() {
            if ch.is_whitespace() {
                continue;
            }

            match self.table.classify_char(ch) {
                Some(CharClass::Tatweel) => {}

                Some(CharClass::Letter) => {
                    if self.extends_cluster(ch, cluster.as_ref(), &chars[i + 1..]) {
                        word.symbols.push(Symbol::Extension { grapheme: ch });
                        if let Some(open) = cluster.as_mut() {
                            open.extended = true;
                        }
                        continue;
                    }

                    word.symbols.push(Symbol::Letter {
                        grapheme: ch,
                        is_geminated: false,
                    });
                    cluster = Some(OpenCluster {
                        index: word.symbols.len() - 1,
                        vowel: None,
                        extended: false,
                    });
                }

                Some(CharClass::Diacritic(kind)) => match cluster.as_mut() {
                    Some(open) => {
                        open.vowel = Some(*kind);
                        word.symbols.push(Symbol::Diacritic { kind: *kind });
                    }
                    None => word.symbols.push(Symbol::Other { raw: ch }),
                },

                Some(CharClass::Shaddah) => match cluster.as_ref() {
                    Some(open) => {
                        if let Some(Symbol::Letter { is_geminated, .. }) =
                            word.symbols.get_mut(open.index)
                        {
                            *is_geminated = true;
                        }
                    }
                    None => word.symbols.push(Symbol::Other { raw: ch }),
                },

                Some(CharClass::ExtensionMark) => match cluster.as_mut() {
                    Some(open) => {
                        open.extended = true;
                        word.symbols.push(Symbol::Extension { grapheme: ch });
                    }
                    None => word.symbols.push(Symbol::Other { raw: ch }),
                },

                Some(CharClass::Stop(key)) => {
                    let mark = StopMark {
                        key: key.clone(),
                        glyph: ch,
                    };
                    word.stop_sign = Some(mark.clone());
                    word.symbols.push(Symbol::StopMark(mark));
                }

                Some(CharClass::SilentMark) | None => word.symbols.push(Symbol::Other { raw: ch }),
            }
        }

        word
    }

    /// A long-vowel letter extends the open cluster when the cluster's
    /// vowel is compatible and the letter carries no mark of its own
    fn extends_cluster(&self, ch: char, cluster: Option<&OpenCluster>, rest: &[char]) -> bool {
        let (Some(compat), Some(open)) = (self.table.long_vowel_compat(ch), cluster) else {
            return false;
        };

        if open.extended {
            return false;
        }

        let compatible = open.vowel.map(|v| compat.contains(&v)).unwrap_or(false);
        if !compatible {
            return false;
        }

        let next = rest
            .iter()
            .find(|c| !matches!(self.table.classify_char(**c), Some(CharClass::Tatweel)));

        !matches!(next, Some(c) if self.table.is_mark(*c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::Tables;

    fn classify(text: &str) -> ClassifiedWord {
        let tables = Tables::builtin().unwrap();
        SymbolClassifier::new(&tables.symbols).classify(text)
    }

    fn letter(grapheme: char, is_geminated: bool) -> Symbol {
        Symbol::Letter {
            grapheme,
            is_geminated,
        }
    }

    fn diacritic(kind: DiacriticKind) -> Symbol {
        Symbol::Diacritic { kind }
    }

    #[test]
    fn test_letters_and_diacritics() {
        let word = classify("بِسْمِ");
        assert_eq!(
            word.symbols,
            vec![
                letter('ب', false),
                diacritic(DiacriticKind::Kasra),
                letter('س', false),
                diacritic(DiacriticKind::Sukun),
                letter('م', false),
                diacritic(DiacriticKind::Kasra),
            ]
        );
        assert!(word.stop_sign.is_none());
    }

    #[test]
    fn test_shaddah_sets_gemination() {
        let word = classify("ٱللَّهِ");
        assert_eq!(word.letters().count(), 4);
        assert_eq!(word.symbols[2], letter('ل', true));
        assert_eq!(word.symbols[3], diacritic(DiacriticKind::Fatha));
    }

    #[test]
    fn test_long_vowel_after_compatible_vowel_is_extension() {
        let word = classify("ٱلرَّحِيمِ");
        assert!(word
            .symbols
            .contains(&Symbol::Extension { grapheme: 'ي' }));
        assert_eq!(word.letters().count(), 5);
    }

    #[test]
    fn test_long_vowel_with_own_mark_opens_letter() {
        // waw carries fatha: consonantal
        let word = classify("هُوَ");
        assert_eq!(word.symbols[2], letter('و', false));
        assert_eq!(word.symbols[3], diacritic(DiacriticKind::Fatha));
    }

    #[test]
    fn test_incompatible_long_vowel_opens_letter() {
        let word = classify("بِا");
        assert_eq!(word.symbols.last(), Some(&letter('ا', false)));
    }

    #[test]
    fn test_dagger_alef_after_tatweel() {
        let word = classify("ٱلرَّحْمَـٰنِ");
        assert!(word
            .symbols
            .contains(&Symbol::Extension { grapheme: '\u{0670}' }));
        assert!(!word.symbols.iter().any(|s| *s == Symbol::Other { raw: 'ـ' }));
    }

    #[test]
    fn test_stray_diacritic_is_other() {
        let word = classify("\u{064E}ب");
        assert_eq!(word.symbols[0], Symbol::Other { raw: '\u{064E}' });
        assert_eq!(word.symbols[1], letter('ب', false));

        let word = classify("\u{0651}");
        assert_eq!(word.symbols, vec![Symbol::Other { raw: '\u{0651}' }]);
    }

    #[test]
    fn test_rightmost_stop_wins() {
        let word = classify("أَحَدٌۚۗ");
        let stop = word.stop_sign.unwrap();
        assert_eq!(stop.key, "preferred_stop");
        assert_eq!(stop.glyph, '\u{06D7}');
        assert_eq!(
            word.symbols
                .iter()
                .filter(|s| matches!(s, Symbol::StopMark(_)))
                .count(),
            2
        );
    }

    #[test]
    fn test_unknown_codepoints_pass_through() {
        let word = classify("قُلْ1؟");
        assert_eq!(word.symbols[4], Symbol::Other { raw: '1' });
        assert_eq!(word.symbols[5], Symbol::Other { raw: '؟' });
        assert_eq!(word.letters().count(), 2);
    }

    #[test]
    fn test_silent_mark_is_other_and_blocks_extension() {
        // alef followed by the small rounded zero stays a letter
        let word = classify("قَالُوا۟");
        assert_eq!(word.symbols.last(), Some(&Symbol::Other { raw: '\u{06DF}' }));
        assert!(word.symbols.contains(&letter('ا', false)));
        assert!(word.symbols.contains(&Symbol::Extension { grapheme: 'و' }));
    }

    #[test]
    fn test_whitespace_and_empty_input() {
        assert!(classify("").symbols.is_empty());
        assert!(classify("   ").symbols.is_empty());
    }
}
