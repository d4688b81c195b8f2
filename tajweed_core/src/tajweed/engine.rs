//! Rule interpreter over the letter stream of a whole request

use super::pause;
use super::rule::{Action, Neighbor, Position, Rule, RuleTable, Site};
use crate::phonemes::LetterUnit;

/// A rule that fired, by word and unit index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleApplication {
    pub rule: String,
    pub word: usize,
    pub unit: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// Final phoneme tokens per word
    pub phonemes: Vec<Vec<String>>,
    pub applications: Vec<RuleApplication>,
}

/// Letter units of all words, flattened, with word-level pause state
struct Stream {
    units: Vec<LetterUnit>,
    word_of: Vec<usize>,
    word_start: Vec<usize>,
    word_final: Vec<Option<usize>>,
    pauses: Vec<bool>,
}

impl Stream {
    fn build(words: Vec<Vec<LetterUnit>>, pauses: &[bool]) -> Self {
        let mut stream = Stream {
            units: Vec::new(),
            word_of: Vec::new(),
            word_start: Vec::with_capacity(words.len()),
            word_final: Vec::with_capacity(words.len()),
            pauses: Vec::with_capacity(words.len()),
        };

        for (w, mut units) in words.into_iter().enumerate() {
            let pause = pauses.get(w).copied().unwrap_or(false);
            if pause {
                pause::apply_waqf(&mut units);
            }
            if stream.is_starting(w) {
                pause::apply_ibtidaa(&mut units);
            }

            let start = stream.units.len();
            stream.word_start.push(start);
            stream
                .word_final
                .push(pause::final_index(&units).map(|i| start + i));
            stream.pauses.push(pause);
            stream.word_of.extend(std::iter::repeat(w).take(units.len()));
            stream.units.extend(units);
        }

        stream
    }

    /// First word, or the word right after a pause
    fn is_starting(&self, word: usize) -> bool {
        word == 0 || self.pauses.get(word - 1).copied().unwrap_or(false)
    }

    fn has_position(&self, index: usize, position: Position) -> bool {
        let word = self.word_of[index];
        let initial = self.word_start[word] == index;
        let last = self.word_final[word] == Some(index);
        match position {
            Position::Initial => initial,
            Position::Final => last,
            Position::Internal => !initial && !last,
        }
    }

    /// Unit at `offset` from `index`, unless reaching it crosses a pause
    fn neighbor(&self, index: usize, offset: i32) -> Option<usize> {
        let target = index as i64 + offset as i64;
        if target < 0 || target >= self.units.len() as i64 {
            return None;
        }
        let target = target as usize;

        let (a, b) = (self.word_of[index], self.word_of[target]);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if self.pauses[lo..hi].iter().any(|p| *p) {
            return None;
        }

        Some(target)
    }

    /// First unit of the next word, unless recitation pauses before it
    fn next_word_initial(&self, word: usize) -> Option<usize> {
        if self.pauses[word] {
            return None;
        }
        let start = *self.word_start.get(word + 1)?;
        (start < self.units.len() && self.word_of[start] == word + 1).then_some(start)
    }

    /// Last vowel phoneme emitted before `index` in the current stretch
    fn prev_vowel(&self, index: usize, rules: &RuleTable) -> Option<String> {
        let word = self.word_of[index];
        for j in (0..index).rev() {
            let w = self.word_of[j];
            if w != word && self.pauses[w] {
                return None;
            }
            if let Some(token) = self.units[j]
                .tokens()
                .into_iter()
                .rev()
                .find(|t| rules.is_vowel_phoneme(t))
            {
                return Some(token);
            }
        }
        None
    }

    fn neighbor_matches(&self, index: usize, neighbor: &Neighbor, rules: &RuleTable) -> bool {
        let Some(j) = self.neighbor(index, neighbor.offset) else {
            return false;
        };
        let unit = &self.units[j];

        if let Some(same_word) = neighbor.same_word {
            if (self.word_of[j] == self.word_of[index]) != same_word {
                return false;
            }
        }
        if let Some(group) = &neighbor.letters {
            if !rules.letters_match(group, unit.grapheme) {
                return false;
            }
        }
        if !neighbor.vowels.is_empty() && !neighbor.vowels.iter().any(|v| v.matches(unit.diacritic)) {
            return false;
        }
        if let Some(geminated) = neighbor.geminated {
            if unit.geminated != geminated {
                return false;
            }
        }

        true
    }

    fn matches(&self, rule: &Rule, index: usize, rules: &RuleTable) -> bool {
        let unit = &self.units[index];
        let trigger = &rule.trigger;
        let word = self.word_of[index];

        if let Some(group) = &trigger.letters {
            if !rules.letters_match(group, unit.grapheme) {
                return false;
            }
        }
        if !trigger.vowels.is_empty() && !trigger.vowels.iter().any(|v| v.matches(unit.diacritic)) {
            return false;
        }
        if trigger.geminated.is_some_and(|g| g != unit.geminated) {
            return false;
        }
        if trigger.extended.is_some_and(|e| e != unit.extended.is_some()) {
            return false;
        }
        if trigger.position.is_some_and(|p| !self.has_position(index, p)) {
            return false;
        }
        if trigger.pause.is_some_and(|p| p != self.pauses[word]) {
            return false;
        }
        if trigger.starting.is_some_and(|s| s != self.is_starting(word)) {
            return false;
        }
        if !trigger.prev_vowel.is_empty() {
            match self.prev_vowel(index, rules) {
                Some(vowel) if trigger.prev_vowel.contains(&vowel) => {}
                _ => return false,
            }
        }

        if let Some(group) = &trigger.followed_by {
            match self.next_word_initial(word) {
                Some(j) if rules.letters_match(group, self.units[j].grapheme) => {}
                _ => return false,
            }
        }

        trigger
            .neighbors
            .iter()
            .all(|n| self.neighbor_matches(index, n, rules))
    }

    fn apply(&mut self, rule: &Rule, index: usize) {
        match &rule.action {
            Action::Replace {
                consonant,
                nasal,
                vowel,
            } => {
                let unit = &mut self.units[index];
                if let Some(consonant) = consonant {
                    unit.consonant = non_empty(consonant);
                    unit.silent = false;
                }
                if let Some(vowel) = vowel {
                    unit.vowel = vowel.clone();
                    unit.tanween = false;
                    unit.silent = false;
                }
                if let Some(nasal) = nasal {
                    set_nasal(unit, nasal);
                }
            }

            Action::Insert { phoneme } => {
                self.units[index].coda.push(phoneme.clone());
            }

            Action::Append { phoneme } => {
                let unit = &mut self.units[index];
                unit.vowel.push(phoneme.clone());
                // the nunation nasal is no longer the last vowel token
                unit.tanween = false;
            }

            Action::MapVowel { map } => {
                for token in self.units[index].vowel.iter_mut() {
                    if let Some(mapped) = map.get(token.as_str()) {
                        *token = mapped.clone();
                    }
                }
            }

            Action::Merge {
                map,
                degeminate,
                nasal,
            } => {
                set_nasal(&mut self.units[index], nasal.as_deref().unwrap_or(""));

                if let Some(next) = self.neighbor(index, 1) {
                    let unit = &mut self.units[next];
                    if let Some(mapped) = map.get(&unit.grapheme.to_string()) {
                        unit.consonant = non_empty(mapped);
                    }
                    if *degeminate {
                        unit.geminated = false;
                    }
                    unit.locked = true;
                }
            }
        }
    }

    fn into_output(self, applications: Vec<RuleApplication>) -> EngineOutput {
        let mut phonemes = vec![Vec::new(); self.word_start.len()];
        for (unit, word) in self.units.iter().zip(self.word_of.iter()) {
            phonemes[*word].extend(unit.tokens());
        }
        EngineOutput {
            phonemes,
            applications,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Rewrite the nasal slot: the nunation token if present, else the consonant
fn set_nasal(unit: &mut LetterUnit, nasal: &str) {
    if unit.tanween {
        if nasal.is_empty() {
            unit.vowel.pop();
            unit.tanween = false;
        } else if let Some(last) = unit.vowel.last_mut() {
            *last = nasal.to_string();
        }
    } else {
        unit.consonant = non_empty(nasal);
    }
}

pub struct RuleEngine<'a> {
    rules: &'a RuleTable,
}

impl<'a> RuleEngine<'a> {
    pub fn new(rules: &'a RuleTable) -> Self {
        Self { rules }
    }

    /// Rewrite the baseline units of consecutive words
    ///
    /// `pauses[w]` says whether recitation stops after word `w`. Each unit is
    /// matched once per site; the first rule in priority order wins.
    pub fn apply(&self, words: Vec<Vec<LetterUnit>>, pauses: &[bool]) -> EngineOutput {
        let mut stream = Stream::build(words, pauses);
        let mut applications = Vec::new();

        for index in 0..stream.units.len() {
            for site in [Site::Onset, Site::Coda] {
                if stream.units[index].locked {
                    break;
                }

                let matched = self
                    .rules
                    .rules_for(site)
                    .find(|rule| stream.matches(rule, index, self.rules));

                if let Some(rule) = matched {
                    stream.apply(rule, index);
                    applications.push(RuleApplication {
                        rule: rule.name.clone(),
                        word: stream.word_of[index],
                        unit: index - stream.word_start[stream.word_of[index]],
                    });
                }
            }
        }

        stream.into_output(applications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonemes::BaseMapper;
    use crate::symbols::SymbolClassifier;
    use crate::tables::Tables;

    fn run_with(tables: &Tables, words: &[&str], pauses: &[bool]) -> EngineOutput {
        let classifier = SymbolClassifier::new(&tables.symbols);
        let mapper = BaseMapper::new(&tables.symbols, &tables.phonemes);
        let units = words
            .iter()
            .map(|w| mapper.map_word(&classifier.classify(w).symbols).unwrap())
            .collect();
        RuleEngine::new(&tables.rules).apply(units, pauses)
    }

    fn run(words: &[&str], pauses: &[bool]) -> Vec<String> {
        let tables = Tables::builtin().unwrap();
        run_with(&tables, words, pauses)
            .phonemes
            .iter()
            .map(|w| w.concat())
            .collect()
    }

    fn fired(words: &[&str], pauses: &[bool]) -> Vec<String> {
        let tables = Tables::builtin().unwrap();
        run_with(&tables, words, pauses)
            .applications
            .into_iter()
            .map(|a| a.rule)
            .collect()
    }

    #[test]
    fn test_basmala() {
        let out = run(
            &["بِسْمِ", "ٱللَّهِ", "ٱلرَّحْمَـٰنِ", "ٱلرَّحِيمِ"],
            &[false, false, false, true],
        );
        assert_eq!(out, vec!["bismi", "lla:hi", "rˤrˤaħma:ni", "rˤrˤaħi:m"]);
    }

    #[test]
    fn test_qalqala_depends_on_pause() {
        assert_eq!(run(&["أَحَدٌ"], &[true]), vec!["ʔaħadQQ"]);
        assert_eq!(
            run(&["أَحَدٌ", "ٱللَّهُ"], &[false, true]),
            vec!["ʔaħaduni", "lla:h"]
        );
    }

    #[test]
    fn test_internal_qalqala() {
        let out = run(&["يَدْخُلُونَ"], &[false]);
        assert_eq!(out, vec!["jadQxulu:na"]);
        assert!(fired(&["يَدْخُلُونَ"], &[false]).contains(&"qalqala".to_string()));
    }

    #[test]
    fn test_hamza_wasl_only_when_starting() {
        assert_eq!(run(&["ٱللَّهُ"], &[true]), vec!["ʔalˤlˤa:h"]);
        assert_eq!(
            run(&["قُلْ", "ٱدْخُلُوا۟"], &[true, true]),
            vec!["qul", "ʔudQxulu:"]
        );
        assert_eq!(
            run(&["هُوَ", "ٱللَّهُ"], &[false, true]),
            vec!["huwa", "lˤlˤa:h"]
        );
    }

    #[test]
    fn test_long_vowel_shortened_before_wasl() {
        let words = ["فِى", "ٱلْأَرْضِ"];
        assert_eq!(run(&words, &[false, true])[0], "fi");
        assert!(fired(&words, &[false, true]).contains(&"wasl_after_long_vowel".to_string()));

        // stopping on the first word keeps the length
        assert_eq!(run(&words, &[true, true])[0], "fi:");
    }

    #[test]
    fn test_tanween_links_into_wasl() {
        let words = ["خَيْرًا", "ٱلْوَصِيَّةُ"];
        assert_eq!(run(&words, &[false, true])[0], "xajrˤani");
        assert!(fired(&words, &[false, true]).contains(&"wasl_after_tanween".to_string()));
        assert_eq!(run(&words, &[true, true])[0], "xajrˤa:");
    }

    #[test]
    fn test_raa_sakin_after_starting_wasl_is_heavy() {
        assert_eq!(run(&["ٱرْجِعْ"], &[true]), vec!["ʔirˤdʒiʕ"]);
        assert!(fired(&["ٱرْجِعْ"], &[true]).contains(&"raa_heavy_after_hamza_wasl".to_string()));
    }

    #[test]
    fn test_stopped_shadda_gets_strongest_qalqala() {
        assert_eq!(run(&["ٱلْحَقُّ"], &[true]), vec!["ʔalħaqqQQQ"]);
        assert_eq!(run(&["ٱلْحَقُّ"], &[false]), vec!["ʔalħaqqu"]);
        assert_eq!(run(&["أَحَدٌ"], &[true]), vec!["ʔaħadQQ"]);
    }

    #[test]
    fn test_divine_name_light_after_kasra() {
        assert_eq!(
            run(&["بِسْمِ", "ٱللَّهِ"], &[false, false]),
            vec!["bismi", "lla:hi"]
        );
    }

    #[test]
    fn test_taa_marbuta_at_pause() {
        assert_eq!(run(&["رَحْمَةً"], &[true]), vec!["rˤaħmah"]);
        assert_eq!(run(&["رَحْمَةً"], &[false]), vec!["rˤaħmatan"]);
    }

    #[test]
    fn test_ikhfaa_across_words() {
        let out = run(&["عَلِيمٌ", "قَدِيرٌ"], &[false, true]);
        assert_eq!(out[0], "ʕali:muŋ");
    }

    #[test]
    fn test_nasal_rules_suppressed_at_pause() {
        let out = run(&["عَلِيمٌ", "قَدِيرٌ"], &[true, true]);
        assert_eq!(out[0], "ʕali:m");
        assert!(!fired(&["عَلِيمٌ", "قَدِيرٌ"], &[true, true]).contains(&"ikhfaa_tanween".to_string()));
    }

    #[test]
    fn test_iqlab() {
        let out = run(&["سَمِيعٌۢ", "بَصِيرٌ"], &[false, true]);
        assert_eq!(out[0], "sami:ʕum̃");
    }

    #[test]
    fn test_idgham_with_ghunnah_merges_into_next_word() {
        let out = run(&["خَيْرًا", "يَرَهُۥ"], &[false, true]);
        assert_eq!(out[0], "xajrˤa");
        assert!(out[1].starts_with("j̃a"));
        assert!(fired(&["خَيْرًا", "يَرَهُۥ"], &[false, true])
            .contains(&"idgham_ghunnah_tanween".to_string()));
    }

    #[test]
    fn test_idgham_without_ghunnah_drops_nasal() {
        let out = run(&["هُدًى", "لِّلْمُتَّقِينَ"], &[false, true]);
        assert_eq!(out[0], "huda");
    }

    #[test]
    fn test_ghunnah_on_geminated_noon() {
        let out = run(&["إِنَّ"], &[false]);
        assert_eq!(out, vec!["ʔiñña"]);
    }

    #[test]
    fn test_idgham_shafawi() {
        let out = run(&["لَهُم", "مَّا"], &[false, true]);
        assert_eq!(out, vec!["lahum̃", "a:"]);
    }

    #[test]
    fn test_raa_after_kasra_is_light() {
        assert_eq!(run(&["فِرْعَوْنَ"], &[false]), vec!["firʕawna"]);
        assert_eq!(run(&["قَرْيَةٍ"], &[false]), vec!["qarˤjatin"]);
    }

    #[test]
    fn test_unmatched_units_pass_through() {
        let tables = Tables::from_strs(
            include_str!("../../resources/symbols.toml"),
            include_str!("../../resources/phonemes.toml"),
            "vowel_phonemes = []",
        )
        .unwrap();
        let out = run_with(&tables, &["إِنَّ"], &[false]);
        assert_eq!(out.phonemes, vec![vec!["ʔ", "i", "nn", "a"]]);
        assert!(out.applications.is_empty());
    }

    #[test]
    fn test_output_is_deterministic() {
        let words = ["قُلْ", "هُوَ", "ٱللَّهُ", "أَحَدٌ"];
        let pauses = [false, false, false, true];
        assert_eq!(run(&words, &pauses), run(&words, &pauses));
    }
}
