//! Word locations
//!
//! A `Location` addresses one word as (chapter, verse, word), all 1-based.
//! Ordering is lexicographic on the triple, which is document order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub chapter: u32,
    pub verse: u32,
    pub word: u32,
}

impl Location {
    pub const fn new(chapter: u32, verse: u32, word: u32) -> Self {
        Self {
            chapter,
            verse,
            word,
        }
    }

    /// (chapter, verse) pair used for verse grouping
    pub fn verse_key(&self) -> (u32, u32) {
        (self.chapter, self.verse)
    }

    pub fn same_verse(&self, other: &Location) -> bool {
        self.verse_key() == other.verse_key()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chapter, self.verse, self.word)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLocationError(pub String);

impl fmt::Display for ParseLocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid location '{}': expected C:V:W", self.0)
    }
}

impl std::error::Error for ParseLocationError {}

impl FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 3 {
            return Err(ParseLocationError(s.to_string()));
        }

        let mut values = [0u32; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<u32>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| ParseLocationError(s.to_string()))?;
        }

        Ok(Location::new(values[0], values[1], values[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order() {
        let a = Location::new(1, 7, 9);
        let b = Location::new(2, 1, 1);
        let c = Location::new(2, 1, 2);
        assert!(a < b && b < c);
        assert!(Location::new(1, 2, 1) > Location::new(1, 1, 30));
    }

    #[test]
    fn test_display_and_parse() {
        let location: Location = "44:43:5".parse().unwrap();
        assert_eq!(location, Location::new(44, 43, 5));
        assert_eq!(location.to_string(), "44:43:5");
    }

    #[test]
    fn test_parse_rejects_bad_keys() {
        assert!("1:1".parse::<Location>().is_err());
        assert!("1:0:1".parse::<Location>().is_err());
        assert!("a:1:1".parse::<Location>().is_err());
        assert!("1:1:1:1".parse::<Location>().is_err());
    }

    #[test]
    fn test_verse_grouping_helpers() {
        let a = Location::new(112, 1, 1);
        assert!(a.same_verse(&Location::new(112, 1, 4)));
        assert!(!a.same_verse(&Location::new(112, 2, 1)));
        assert_eq!(a.verse_key(), (112, 1));
    }
}
