//! Reference grammar
//!
//! ```text
//! P   := C | C:V | C:V:W
//! Ref := P | P " - " P
//! ```

use super::error::{ReferenceError, ReferenceResult};
use crate::config::compile_time::reference::{MAX_COMPONENT_VALUE, MAX_REFERENCE_LENGTH};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

const REFERENCE_PATTERN: &str = r"^[0-9]+(:[0-9]+){0,2}( - [0-9]+(:[0-9]+){0,2})?$";

static PATTERN: OnceLock<Result<Regex, String>> = OnceLock::new();

fn pattern() -> ReferenceResult<&'static Regex> {
    PATTERN
        .get_or_init(|| Regex::new(REFERENCE_PATTERN).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|message| ReferenceError::Pattern {
            message: message.clone(),
        })
}

/// One endpoint; omitted components mean the whole unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub chapter: u32,
    pub verse: Option<u32>,
    pub word: Option<u32>,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chapter)?;
        if let Some(verse) = self.verse {
            write!(f, ":{}", verse)?;
        }
        if let Some(word) = self.word {
            write!(f, ":{}", word)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceExpr {
    Single(Point),
    Range(Point, Point),
}

impl ReferenceExpr {
    pub fn start(&self) -> Point {
        match self {
            ReferenceExpr::Single(p) | ReferenceExpr::Range(p, _) => *p,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            ReferenceExpr::Single(p) | ReferenceExpr::Range(_, p) => *p,
        }
    }
}

impl fmt::Display for ReferenceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceExpr::Single(p) => write!(f, "{}", p),
            ReferenceExpr::Range(a, b) => write!(f, "{} - {}", a, b),
        }
    }
}

const COMPONENT_NAMES: [&str; 3] = ["chapter", "verse", "word"];

fn parse_component(name: &str, text: &str) -> ReferenceResult<u32> {
    let invalid = || ReferenceError::InvalidComponent {
        component: name.to_string(),
        value: text.to_string(),
    };

    let value: u32 = text.parse().map_err(|_| invalid())?;
    if value == 0 || value > MAX_COMPONENT_VALUE {
        return Err(invalid());
    }
    Ok(value)
}

fn parse_point(text: &str) -> ReferenceResult<Point> {
    let mut values = [None; 3];
    for (i, part) in text.split(':').enumerate() {
        values[i] = Some(parse_component(COMPONENT_NAMES[i], part)?);
    }

    Ok(Point {
        // the grammar guarantees at least one component
        chapter: values[0].unwrap_or(1),
        verse: values[1],
        word: values[2],
    })
}

/// Parse a reference string without consulting any corpus
pub fn parse_reference(input: &str) -> ReferenceResult<ReferenceExpr> {
    if input.len() > MAX_REFERENCE_LENGTH {
        return Err(ReferenceError::TooLong {
            length: input.len(),
        });
    }

    if !pattern()?.is_match(input) {
        return Err(ReferenceError::GrammarMismatch {
            input: input.to_string(),
        });
    }

    match input.split_once(" - ") {
        Some((start, end)) => Ok(ReferenceExpr::Range(parse_point(start)?, parse_point(end)?)),
        None => Ok(ReferenceExpr::Single(parse_point(input)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn point(chapter: u32, verse: Option<u32>, word: Option<u32>) -> Point {
        Point {
            chapter,
            verse,
            word,
        }
    }

    #[test]
    fn test_grammar_examples() {
        assert_eq!(
            parse_reference("1").unwrap(),
            ReferenceExpr::Single(point(1, None, None))
        );
        assert_eq!(
            parse_reference("1:1:1").unwrap(),
            ReferenceExpr::Single(point(1, Some(1), Some(1)))
        );
        assert_eq!(
            parse_reference("1:1 - 1:2:2").unwrap(),
            ReferenceExpr::Range(point(1, Some(1), None), point(1, Some(2), Some(2)))
        );
        assert_eq!(
            parse_reference("1 - 2:2").unwrap(),
            ReferenceExpr::Range(point(1, None, None), point(2, Some(2), None))
        );
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["112", "44:43 - 44:44", "1:1:1 - 2"] {
            assert_eq!(parse_reference(input).unwrap().to_string(), input);
        }
    }

    #[test]
    fn test_grammar_is_bit_exact() {
        for input in [
            "", "1:", ":1", "1-2", "1 -2", "1 - ", "1:1:1:1", " 1", "1 ", "a", "1:x", "١",
            "1 – 2",
        ] {
            assert_matches!(
                parse_reference(input),
                Err(ReferenceError::GrammarMismatch { .. }),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_zero_component_rejected() {
        assert_matches!(
            parse_reference("1:0"),
            Err(ReferenceError::InvalidComponent { component, .. }) if component == "verse"
        );
        assert_matches!(
            parse_reference("0"),
            Err(ReferenceError::InvalidComponent { .. })
        );
    }

    #[test]
    fn test_overflowing_component_rejected() {
        assert_matches!(
            parse_reference("99999999999"),
            Err(ReferenceError::InvalidComponent { .. })
        );
    }

    #[test]
    fn test_too_long() {
        let input = "1".repeat(MAX_REFERENCE_LENGTH + 1);
        assert_matches!(parse_reference(&input), Err(ReferenceError::TooLong { .. }));
    }
}
