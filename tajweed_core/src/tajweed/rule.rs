//! Declarative rule records and the validated rule table

use super::error::RuleTableError;
use crate::config::compile_time::rules::{MAX_GROUPS, MAX_NEIGHBOR_OFFSET, MAX_RULES};
use crate::symbols::DiacriticKind;
use crate::tables::{TableError, TableResult};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// A named letter group or an inline letter list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GroupRef {
    Named(String),
    Inline(Vec<String>),
}

/// Vowel state of a letter cluster as seen by rule triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VowelState {
    Fatha,
    Damma,
    Kasra,
    Fathatan,
    Dammatan,
    Kasratan,
    Sukun,
    /// No diacritic at all
    Unmarked,
    /// No diacritic or sukun
    Unvoweled,
    /// Any nunation mark
    Tanween,
    /// Any mark except sukun
    Voweled,
}

impl VowelState {
    pub fn matches(&self, diacritic: Option<DiacriticKind>) -> bool {
        use DiacriticKind as D;
        match self {
            VowelState::Fatha => diacritic == Some(D::Fatha),
            VowelState::Damma => diacritic == Some(D::Damma),
            VowelState::Kasra => diacritic == Some(D::Kasra),
            VowelState::Fathatan => diacritic == Some(D::Fathatan),
            VowelState::Dammatan => diacritic == Some(D::Dammatan),
            VowelState::Kasratan => diacritic == Some(D::Kasratan),
            VowelState::Sukun => diacritic == Some(D::Sukun),
            VowelState::Unmarked => diacritic.is_none(),
            VowelState::Unvoweled => matches!(diacritic, None | Some(D::Sukun)),
            VowelState::Tanween => diacritic.map(|d| d.is_tanween()).unwrap_or(false),
            VowelState::Voweled => matches!(diacritic, Some(d) if d != D::Sukun),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Initial,
    Final,
    Internal,
}

/// Which part of a cluster a rule rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    /// Consonant and vowel
    #[default]
    Onset,
    /// Nasal, echo or linking vowel after the consonant
    Coda,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Neighbor {
    pub offset: i32,
    #[serde(default)]
    pub letters: Option<GroupRef>,
    #[serde(default)]
    pub vowels: Vec<VowelState>,
    #[serde(default)]
    pub geminated: Option<bool>,
    /// `true`: must be in the focus word, `false`: must be in another word
    #[serde(default)]
    pub same_word: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trigger {
    #[serde(default)]
    pub letters: Option<GroupRef>,
    #[serde(default)]
    pub vowels: Vec<VowelState>,
    #[serde(default)]
    pub geminated: Option<bool>,
    /// Cluster carries a long-vowel extension
    #[serde(default)]
    pub extended: Option<bool>,
    #[serde(default)]
    pub position: Option<Position>,
    /// Recitation pauses at the end of the focus word
    #[serde(default)]
    pub pause: Option<bool>,
    /// Focus word starts a stretch of recitation
    #[serde(default)]
    pub starting: Option<bool>,
    /// Last vowel phoneme surfaced before the focus
    #[serde(default)]
    pub prev_vowel: Vec<String>,
    #[serde(default)]
    pub neighbors: Vec<Neighbor>,
    /// First letter of the next word, when recitation runs on into it
    #[serde(default)]
    pub followed_by: Option<GroupRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Empty strings remove the slot
    Replace {
        #[serde(default)]
        consonant: Option<String>,
        #[serde(default)]
        nasal: Option<String>,
        #[serde(default)]
        vowel: Option<Vec<String>>,
    },
    /// Add a phoneme after the consonant
    Insert { phoneme: String },
    /// Add a phoneme after the vowel, nunation included
    Append { phoneme: String },
    /// Rewrite vowel tokens found in `map`
    MapVowel { map: BTreeMap<String, String> },
    /// Fold the focus nasal into the next letter
    Merge {
        #[serde(default)]
        map: BTreeMap<String, String>,
        #[serde(default)]
        degeminate: bool,
        /// Replacement for the focus nasal; absent drops it
        #[serde(default)]
        nasal: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub site: Site,
    #[serde(default)]
    pub trigger: Trigger,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRuleTable {
    #[serde(default)]
    groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    vowel_phonemes: Vec<String>,
    #[serde(default)]
    rules: Vec<Rule>,
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    groups: BTreeMap<String, HashSet<char>>,
    vowel_phonemes: HashSet<String>,
    /// Sorted by descending priority; ties keep file order
    rules: Vec<Rule>,
}

fn letter_char(context: &str, letter: &str) -> Result<char, RuleTableError> {
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(RuleTableError::MultiCodepointLetter {
            context: context.to_string(),
            letter: letter.to_string(),
        }),
    }
}

impl RuleTable {
    pub fn from_toml(source: &str) -> TableResult<Self> {
        let raw: RawRuleTable = toml::from_str(source).map_err(|e| TableError::parse("rules", e))?;
        Ok(Self::from_raw(raw)?)
    }

    fn from_raw(raw: RawRuleTable) -> Result<Self, RuleTableError> {
        if raw.groups.len() > MAX_GROUPS {
            return Err(RuleTableError::TooManyGroups {
                count: raw.groups.len(),
            });
        }
        if raw.rules.len() > MAX_RULES {
            return Err(RuleTableError::TooManyRules {
                count: raw.rules.len(),
            });
        }

        let mut groups = BTreeMap::new();
        for (name, letters) in &raw.groups {
            let context = format!("group '{}'", name);
            let set = letters
                .iter()
                .map(|l| letter_char(&context, l))
                .collect::<Result<HashSet<_>, _>>()?;
            groups.insert(name.clone(), set);
        }

        let mut names = HashSet::new();
        for (index, rule) in raw.rules.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(RuleTableError::EmptyName { index });
            }
            if !names.insert(rule.name.as_str()) {
                return Err(RuleTableError::DuplicateName {
                    rule: rule.name.clone(),
                });
            }
            Self::validate_rule(rule, &groups)?;
        }

        let mut rules = raw.rules;
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));

        Ok(Self {
            groups,
            vowel_phonemes: raw.vowel_phonemes.into_iter().collect(),
            rules,
        })
    }

    fn validate_group_ref(
        rule: &Rule,
        group: &GroupRef,
        groups: &BTreeMap<String, HashSet<char>>,
    ) -> Result<(), RuleTableError> {
        match group {
            GroupRef::Named(name) if !groups.contains_key(name) => {
                Err(RuleTableError::UnknownGroup {
                    rule: rule.name.clone(),
                    group: name.clone(),
                })
            }
            GroupRef::Named(_) => Ok(()),
            GroupRef::Inline(letters) => {
                let context = format!("rule '{}'", rule.name);
                for letter in letters {
                    letter_char(&context, letter)?;
                }
                Ok(())
            }
        }
    }

    fn validate_rule(
        rule: &Rule,
        groups: &BTreeMap<String, HashSet<char>>,
    ) -> Result<(), RuleTableError> {
        for group in rule.trigger.letters.iter().chain(&rule.trigger.followed_by) {
            Self::validate_group_ref(rule, group, groups)?;
        }

        for neighbor in &rule.trigger.neighbors {
            if neighbor.offset == 0 || neighbor.offset.abs() > MAX_NEIGHBOR_OFFSET {
                return Err(RuleTableError::InvalidNeighborOffset {
                    rule: rule.name.clone(),
                    offset: neighbor.offset,
                });
            }
            if let Some(group) = &neighbor.letters {
                Self::validate_group_ref(rule, group, groups)?;
            }
        }

        if let Action::Merge { map, .. } = &rule.action {
            let context = format!("merge map of rule '{}'", rule.name);
            for letter in map.keys() {
                letter_char(&context, letter)?;
            }
        }

        Ok(())
    }

    /// Check that every letter the rules name is one the classifier produces
    pub fn check_letters(&self, is_letter: impl Fn(char) -> bool) -> Result<(), RuleTableError> {
        let unknown = |context: String, c: char| RuleTableError::UnknownLetter {
            context,
            letter: c.to_string(),
        };

        for (name, letters) in &self.groups {
            if let Some(c) = letters.iter().find(|c| !is_letter(**c)) {
                return Err(unknown(format!("group '{}'", name), *c));
            }
        }

        for rule in &self.rules {
            let inline = rule
                .trigger
                .letters
                .iter()
                .chain(&rule.trigger.followed_by)
                .chain(rule.trigger.neighbors.iter().filter_map(|n| n.letters.as_ref()));
            for group in inline {
                if let GroupRef::Inline(letters) = group {
                    for c in letters.iter().filter_map(|l| l.chars().next()) {
                        if !is_letter(c) {
                            return Err(unknown(format!("rule '{}'", rule.name), c));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    pub fn letters_match(&self, group: &GroupRef, letter: char) -> bool {
        match group {
            GroupRef::Named(name) => self
                .groups
                .get(name)
                .map(|set| set.contains(&letter))
                .unwrap_or(false),
            GroupRef::Inline(letters) => letters.iter().any(|l| l.chars().next() == Some(letter)),
        }
    }

    pub fn is_vowel_phoneme(&self, token: &str) -> bool {
        self.vowel_phonemes.contains(token)
    }

    /// Rules for a site, highest priority first
    pub fn rules_for(&self, site: Site) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.site == site)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse(source: &str) -> TableResult<RuleTable> {
        RuleTable::from_toml(source)
    }

    #[test]
    fn test_rules_sorted_by_priority_stable() {
        let table = parse(
            r#"
groups = { qalqala = ["ق", "د"] }

[[rules]]
name = "low"
priority = 1
action = { kind = "insert", phoneme = "Q" }

[[rules]]
name = "high"
priority = 5
action = { kind = "insert", phoneme = "QQ" }

[[rules]]
name = "low_second"
priority = 1
site = "coda"
trigger = { letters = "qalqala", vowels = ["sukun"] }
action = { kind = "insert", phoneme = "Q" }
"#,
        )
        .unwrap();

        let names: Vec<&str> = table.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["high", "low", "low_second"]);
        assert_eq!(table.rules_for(Site::Coda).count(), 1);
        assert!(table.letters_match(&GroupRef::Named("qalqala".into()), 'د'));
        assert!(!table.letters_match(&GroupRef::Named("qalqala".into()), 'ب'));
        assert!(table.letters_match(&GroupRef::Inline(vec!["ب".into()]), 'ب'));
    }

    #[test]
    fn test_unknown_group_rejected() {
        let result = parse(
            r#"
[[rules]]
name = "ikhfaa"
trigger = { letters = "missing" }
action = { kind = "replace", nasal = "ŋ" }
"#,
        );
        assert_matches!(
            result,
            Err(TableError::Rules(RuleTableError::UnknownGroup { group, .. })) if group == "missing"
        );
    }

    #[test]
    fn test_zero_offset_rejected() {
        let result = parse(
            r#"
[[rules]]
name = "bad"
trigger = { neighbors = [{ offset = 0 }] }
action = { kind = "insert", phoneme = "Q" }
"#,
        );
        assert_matches!(
            result,
            Err(TableError::Rules(RuleTableError::InvalidNeighborOffset { offset: 0, .. }))
        );
    }

    #[test]
    fn test_offset_beyond_limit_rejected() {
        let source = format!(
            r#"
[[rules]]
name = "far"
trigger = {{ neighbors = [{{ offset = {} }}] }}
action = {{ kind = "insert", phoneme = "Q" }}
"#,
            MAX_NEIGHBOR_OFFSET + 1
        );
        assert_matches!(
            parse(&source),
            Err(TableError::Rules(RuleTableError::InvalidNeighborOffset { .. }))
        );
    }

    #[test]
    fn test_multi_codepoint_letter_rejected() {
        let result = parse(r#"groups = { bad = ["قد"] }"#);
        assert_matches!(
            result,
            Err(TableError::Rules(RuleTableError::MultiCodepointLetter { .. }))
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = parse(
            r#"
[[rules]]
name = " "
action = { kind = "insert", phoneme = "Q" }
"#,
        );
        assert_matches!(
            result,
            Err(TableError::Rules(RuleTableError::EmptyName { index: 0 }))
        );
    }

    #[test]
    fn test_too_many_rules_rejected() {
        let mut source = String::new();
        for i in 0..=MAX_RULES {
            source.push_str(&format!(
                "[[rules]]\nname = \"r{}\"\naction = {{ kind = \"insert\", phoneme = \"Q\" }}\n",
                i
            ));
        }
        assert_matches!(
            parse(&source),
            Err(TableError::Rules(RuleTableError::TooManyRules { .. }))
        );
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert_matches!(
            parse("[[rules]]\nname = \"x\"\naction = { kind = \"explode\" }"),
            Err(TableError::Parse { .. })
        );
    }

    #[test]
    fn test_linking_rules_parse() {
        let table = parse(
            r#"
[[rules]]
name = "link_tanween"
site = "coda"
trigger = { vowels = ["tanween"], followed_by = ["ٱ"] }
action = { kind = "append", phoneme = "i" }

[[rules]]
name = "link_long_vowel"
site = "coda"
trigger = { extended = true, followed_by = ["ٱ"] }
action = { kind = "map_vowel", map = { "i:" = "i" } }
"#,
        )
        .unwrap();

        let long = &table.rules()[1];
        assert_eq!(long.trigger.extended, Some(true));
        assert_eq!(long.trigger.followed_by, Some(GroupRef::Inline(vec!["ٱ".into()])));
        assert_matches!(&long.action, Action::MapVowel { map } if map["i:"] == "i");
        assert_matches!(&table.rules()[0].action, Action::Append { phoneme } if phoneme == "i");

        let unknown = parse(
            r#"
[[rules]]
name = "link"
trigger = { followed_by = "wasl" }
action = { kind = "append", phoneme = "i" }
"#,
        );
        assert_matches!(
            unknown,
            Err(TableError::Rules(RuleTableError::UnknownGroup { group, .. })) if group == "wasl"
        );
    }

    #[test]
    fn test_check_letters() {
        let table = parse(r#"groups = { iqlab = ["ب"] }"#).unwrap();
        assert!(table.check_letters(|c| c == 'ب').is_ok());
        assert_matches!(
            table.check_letters(|_| false),
            Err(RuleTableError::UnknownLetter { .. })
        );
    }

    #[test]
    fn test_vowel_states() {
        assert!(VowelState::Unvoweled.matches(None));
        assert!(VowelState::Unvoweled.matches(Some(DiacriticKind::Sukun)));
        assert!(!VowelState::Unvoweled.matches(Some(DiacriticKind::Fatha)));
        assert!(VowelState::Tanween.matches(Some(DiacriticKind::Kasratan)));
        assert!(VowelState::Voweled.matches(Some(DiacriticKind::Dammatan)));
        assert!(!VowelState::Voweled.matches(Some(DiacriticKind::Sukun)));
        assert!(!VowelState::Unmarked.matches(Some(DiacriticKind::Sukun)));
    }
}
