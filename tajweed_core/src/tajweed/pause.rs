//! Pause forms applied before rule matching
//!
//! Waqf rewrites the last sounded letter of a word recitation stops on;
//! ibtidaa removes gemination from the first letter recitation starts on.

use crate::phonemes::LetterUnit;
use crate::symbols::DiacriticKind;
use crate::tables::LetterKind;

/// Index of the last unit that is pronounced
pub fn final_index(units: &[LetterUnit]) -> Option<usize> {
    units.iter().rposition(|u| !u.silent)
}

pub fn apply_waqf(units: &mut [LetterUnit]) {
    let Some(index) = final_index(units) else {
        return;
    };
    let unit = &mut units[index];

    match (unit.kind, unit.diacritic, unit.extended.clone()) {
        (LetterKind::Hamza, Some(DiacriticKind::Fathatan), _) => {
            unit.vowel.truncate(1);
            unit.diacritic = Some(DiacriticKind::Fatha);
            unit.tanween = false;
        }
        (_, Some(DiacriticKind::Fathatan), Some(long)) => {
            unit.vowel = vec![long];
            unit.diacritic = Some(DiacriticKind::Fatha);
            unit.tanween = false;
        }
        (_, _, Some(_)) if !unit.tanween => {}
        (LetterKind::Alef | LetterKind::AlefMaksura, _, _) => {
            unit.vowel.clear();
            unit.tanween = false;
        }
        _ => {
            if unit.diacritic.is_some() || unit.consonant.is_some() {
                unit.diacritic = Some(DiacriticKind::Sukun);
                unit.vowel.clear();
                unit.tanween = false;
            }
        }
    }
}

pub fn apply_ibtidaa(units: &mut [LetterUnit]) {
    if let Some(first) = units.first_mut() {
        first.geminated = false;
    }
}
