//! Reference resolution
//!
//! Parsing is corpus-independent; resolution expands whole-chapter and
//! whole-verse endpoints against corpus counts and enumerates every word
//! location in between.

pub mod error;
pub mod parser;

pub use error::{ReferenceError, ReferenceResult};
pub use parser::{parse_reference, Point, ReferenceExpr};

use crate::corpus::CorpusMetadata;
use crate::location::Location;
use crate::{log_debug, log_success};

/// Which end of the range a point is expanded for
#[derive(Clone, Copy, PartialEq, Eq)]
enum Edge {
    First,
    Last,
}

fn check(component: &str, value: u32, max: u32, context: String) -> ReferenceResult<u32> {
    if value == 0 || value > max {
        return Err(ReferenceError::out_of_range(component, value, max, context));
    }
    Ok(value)
}

fn expand(point: Point, edge: Edge, corpus: &dyn CorpusMetadata) -> ReferenceResult<Location> {
    let chapter = check("chapter", point.chapter, corpus.chapter_count(), String::new())?;
    let verse_count = corpus.verse_count(chapter).unwrap_or(0);

    let verse = match (point.verse, edge) {
        (Some(v), _) => v,
        (None, Edge::First) => 1,
        (None, Edge::Last) => verse_count,
    };
    let verse = check("verse", verse, verse_count, format!(" in chapter {}", chapter))?;
    let word_count = corpus.word_count(chapter, verse).unwrap_or(0);

    let word = match (point.word, edge) {
        (Some(w), _) => w,
        (None, Edge::First) => 1,
        (None, Edge::Last) => word_count,
    };
    let word = check(
        "word",
        word,
        word_count,
        format!(" in verse {}:{}", chapter, verse),
    )?;

    Ok(Location::new(chapter, verse, word))
}

/// Every location from `start` to `end` inclusive, in document order
fn enumerate(start: Location, end: Location, corpus: &dyn CorpusMetadata) -> Vec<Location> {
    let mut locations = Vec::new();

    for chapter in start.chapter..=end.chapter {
        let first_verse = if chapter == start.chapter { start.verse } else { 1 };
        let last_verse = if chapter == end.chapter {
            end.verse
        } else {
            corpus.verse_count(chapter).unwrap_or(0)
        };

        for verse in first_verse..=last_verse {
            let here = (chapter, verse);
            let first_word = if here == start.verse_key() { start.word } else { 1 };
            let last_word = if here == end.verse_key() {
                end.word
            } else {
                corpus.word_count(chapter, verse).unwrap_or(0)
            };

            locations.extend((first_word..=last_word).map(|w| Location::new(chapter, verse, w)));
        }
    }

    locations
}

/// Resolve a parsed reference to its ordered word locations
pub fn resolve(
    expr: &ReferenceExpr,
    corpus: &dyn CorpusMetadata,
) -> ReferenceResult<Vec<Location>> {
    let start = expand(expr.start(), Edge::First, corpus)?;
    let end = expand(expr.end(), Edge::Last, corpus)?;

    if end < start {
        return Err(ReferenceError::RangeReversed { start, end });
    }

    let locations = enumerate(start, end, corpus);

    log_debug!("Reference expanded",
        "reference" => expr.to_string(),
        "start" => start.to_string(),
        "end" => end.to_string()
    );

    Ok(locations)
}

/// Parse and resolve in one step
pub fn resolve_reference(
    input: &str,
    corpus: &dyn CorpusMetadata,
) -> ReferenceResult<Vec<Location>> {
    let expr = parse_reference(input)?;
    let locations = resolve(&expr, corpus)?;

    log_success!(crate::logging::codes::success::REFERENCE_RESOLVED,
        "Reference resolved",
        "reference" => input,
        "words" => locations.len()
    );

    Ok(locations)
}
