mod error;
mod info;
mod request;
mod validation;

// Re-export public types
pub use error::PipelineError;
pub use info::{get_pipeline_info, PipelineInfo};
pub use request::PhonemizeRequest;
pub use validation::validate_pipeline;

use crate::boundary::{BoundaryResolver, StopTable};
use crate::config::runtime::EnginePreferences;
use crate::corpus::Corpus;
use crate::location::Location;
use crate::logging::{self, codes};
use crate::phonemes::BaseMapper;
use crate::reference;
use crate::result::{assemble_text, PhonemizeResult, RenderConfig};
use crate::symbols::{is_verse_number, SymbolClassifier};
use crate::tables::Tables;
use crate::tajweed::RuleEngine;
use crate::word::Word;
use std::sync::Arc;
use std::time::Instant;

/// Converts references into phoneme sequences
///
/// Holds only immutable tables, so one instance can serve any number of
/// threads.
#[derive(Debug, Clone)]
pub struct Phonemizer {
    tables: Arc<Tables>,
    stops: StopTable,
    preferences: EnginePreferences,
}

impl Phonemizer {
    pub fn new(tables: Arc<Tables>) -> Self {
        let stops = StopTable::from_symbols(&tables.symbols);
        Self {
            tables,
            stops,
            preferences: EnginePreferences::default(),
        }
    }

    /// Phonemizer over the built-in tables
    pub fn builtin() -> Result<Self, PipelineError> {
        Ok(Self::new(Arc::new(Tables::builtin()?)))
    }

    pub fn with_preferences(mut self, preferences: EnginePreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn stop_table(&self) -> &StopTable {
        &self.stops
    }

    pub fn phonemize<C: Corpus>(
        &self,
        corpus: &C,
        request: &PhonemizeRequest,
    ) -> Result<PhonemizeResult, PipelineError> {
        self.phonemize_with_id(corpus, request, 0)
    }

    /// Process one request under its own logging context
    pub fn phonemize_with_id<C: Corpus>(
        &self,
        corpus: &C,
        request: &PhonemizeRequest,
        request_id: usize,
    ) -> Result<PhonemizeResult, PipelineError> {
        logging::with_request_context(&request.reference, request_id, || {
            let result = self.run(corpus, request);

            if let Err(e) = &result {
                crate::log_error!(e.error_code(), "Phonemization failed",
                    "reference" => request.reference,
                    "error" => e
                );
            }

            result
        })
    }

    fn run<C: Corpus>(
        &self,
        corpus: &C,
        request: &PhonemizeRequest,
    ) -> Result<PhonemizeResult, PipelineError> {
        let start_time = Instant::now();

        crate::log_info!("Starting phonemization",
            "reference" => request.reference,
            "stops" => request.stops,
            "newline_mode" => request.newline_mode
        );

        // Stage 1: reference resolution
        let locations = reference::resolve_reference(&request.reference, corpus)?;
        let resolver = BoundaryResolver::new(&self.stops, &request.stops)?;

        // Stage 2: word text and symbol classification
        let classifier = SymbolClassifier::new(&self.tables.symbols);
        let mut sources: Vec<(Location, &str)> = Vec::with_capacity(locations.len());
        let mut words: Vec<Word> = Vec::with_capacity(locations.len());

        for location in locations {
            let text = corpus.require_word(location)?;
            sources.push((location, text));

            if is_verse_number(text.trim()) {
                crate::log_debug!("Skipping verse number", "location" => location);
                continue;
            }

            let classified = classifier.classify(text);
            let verse_end = ends_verse(corpus, location);
            words.push(Word::new(location, text, classified, verse_end));
        }

        // Stage 3: pauses and segments
        let boundaries = resolver.resolve(&words);
        for (word, boundary) in words.iter_mut().zip(&boundaries) {
            word.boundary = *boundary;
        }

        crate::log_debug!("Boundaries resolved",
            "words" => words.len(),
            "pauses" => boundaries.iter().filter(|b| b.pause).count(),
            "segments" => boundaries.iter().filter(|b| b.segment).count()
        );

        // Stage 4: baseline phonemes
        let mapper = BaseMapper::new(&self.tables.symbols, &self.tables.phonemes);
        let units = words
            .iter()
            .map(|word| mapper.map_word(&word.symbols))
            .collect::<Result<Vec<_>, _>>()?;

        // Stage 5: Tajweed rules
        let pauses: Vec<bool> = boundaries.iter().map(|b| b.pause).collect();
        let output = RuleEngine::new(&self.tables.rules).apply(units, &pauses);

        if self.preferences.log_rule_applications {
            for application in &output.applications {
                crate::log_debug!("Rule applied",
                    "rule" => application.rule,
                    "location" => words[application.word].location,
                    "letter" => application.unit + 1
                );
            }
        }

        for (word, phonemes) in words.iter_mut().zip(output.phonemes) {
            word.phonemes = phonemes;
        }

        // Stage 6: result assembly
        let result = PhonemizeResult {
            reference: request.reference.clone(),
            text: assemble_text(sources),
            words,
            render: RenderConfig::for_newline_mode(request.newline_mode),
        };

        crate::log_success!(codes::success::REQUEST_COMPLETE, "Phonemization complete",
            "reference" => request.reference,
            "words" => result.words.len(),
            "rules_applied" => output.applications.len(),
            "duration_ms" => format!("{:.2}", start_time.elapsed().as_secs_f64() * 1000.0)
        );

        Ok(result)
    }
}

/// Last word of its verse, ignoring trailing verse-number words
fn ends_verse<C: Corpus>(corpus: &C, location: Location) -> bool {
    let Some(count) = corpus.word_count(location.chapter, location.verse) else {
        return true;
    };

    (location.word + 1..=count).all(|w| {
        corpus
            .word_text(Location::new(location.chapter, location.verse, w))
            .map(|text| is_verse_number(text.trim()))
            .unwrap_or(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BoundaryError, StopSelection};
    use crate::corpus::MemoryCorpus;
    use crate::reference::ReferenceError;
    use crate::result::NewlineMode;
    use assert_matches::assert_matches;

    fn corpus() -> MemoryCorpus {
        MemoryCorpus::default()
            .with_verse(1, 1, &["بِسْمِ", "ٱللَّهِ", "ٱلرَّحْمَـٰنِ", "ٱلرَّحِيمِ"])
            .with_verse(44, 43, &["إِنَّ", "شَجَرَتَ", "ٱلزَّقُّومِ"])
            .with_verse(44, 44, &["طَعَامُ", "ٱلْأَثِيمِ"])
            .with_verse(112, 1, &["قُلْ", "هُوَ", "ٱللَّهُ", "أَحَدٌ"])
            .with_verse(112, 2, &["ٱللَّهُ", "ٱلصَّمَدُ"])
            .with_verse(112, 3, &["لَمْ", "يَلِدْ", "وَلَمْ", "يُولَدْ"])
            .with_verse(112, 4, &["وَلَمْ", "يَكُن", "لَّهُۥ", "كُفُوًا", "أَحَدٌۢ"])
    }

    fn phonemizer() -> Phonemizer {
        Phonemizer::builtin().unwrap()
    }

    fn word_strings(result: &PhonemizeResult) -> Vec<String> {
        result.words.iter().map(|w| w.phonemes.concat()).collect()
    }

    #[test]
    fn test_validate_pipeline() {
        let _ = crate::logging::init_global_logging();
        let result = validate_pipeline();
        assert!(result.is_ok());
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        match error {
            PipelineError::Pipeline { message } => {
                assert_eq!(message, "Test error");
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_basmala() {
        let request = PhonemizeRequest::new("1:1").with_stops(StopSelection::none());
        let result = phonemizer().phonemize(&corpus(), &request).unwrap();

        assert_eq!(
            result.render_with(&RenderConfig::default()),
            "bismi lla:hi rˤrˤaħma:ni rˤrˤaħi:m"
        );
        assert_eq!(result.words.len(), 4);
        assert!(result.words[3].boundary.pause);
    }

    #[test]
    fn test_chapter_groups_by_verse() {
        let request = PhonemizeRequest::new("112");
        let result = phonemizer().phonemize(&corpus(), &request).unwrap();

        assert_eq!(result.phonemes_by_verse().len(), 4);
        assert_eq!(result.phonemes_nested()[3].len(), 5);
        assert_eq!(result.phonemes_text().lines().count(), 4);
        assert!(result.words.iter().all(|w| !w.phonemes.is_empty()));

        let words = word_strings(&result);
        assert_eq!(&words[..4], &["qul", "huwa", "lˤlˤa:hu", "ʔaħadQQ"]);
        // 112:2 restarts on its hamza wasl
        assert_eq!(words[4], "ʔalˤlˤa:hu");
        // 112:4 ends the range; tanween before hamza stays clear
        assert_eq!(&words[13..], &["kufuwan", "ʔaħadQQ"]);

        let verse_ends: Vec<&str> = result
            .words
            .iter()
            .zip(&words)
            .filter(|(w, _)| w.verse_end)
            .map(|(_, p)| p.as_str())
            .collect();
        assert_eq!(verse_ends.len(), 4);
        assert!(verse_ends
            .iter()
            .all(|p| !p.ends_with('ŋ') && !p.ends_with("un") && !p.ends_with("uni")));
    }

    #[test]
    fn test_verse_boundary_without_pause_links_words() {
        let request = PhonemizeRequest::new("112:1 - 112:2").with_stops(StopSelection::none());
        let result = phonemizer().phonemize(&corpus(), &request).unwrap();

        let words = word_strings(&result);
        assert_eq!(words[3], "ʔaħaduni");
        // the linking kasra makes the lam of the divine name light
        assert_eq!(words[4], "lla:hu");
        assert!(result.words[3].boundary.segment);
        assert!(!result.words[3].boundary.pause);
    }

    #[test]
    fn test_verse_pause_changes_boundary_word() {
        let range = "44:43 - 44:44";
        let phonemizer = phonemizer();

        let paused = phonemizer
            .phonemize(&corpus(), &PhonemizeRequest::new(range))
            .unwrap();
        let joined = phonemizer
            .phonemize(
                &corpus(),
                &PhonemizeRequest::new(range).with_stops(StopSelection::none()),
            )
            .unwrap();

        assert_eq!(word_strings(&paused)[2], "zzaqqu:m");
        assert_eq!(word_strings(&joined)[2], "zzaqqu:mi");
        assert!(paused.words[2].boundary.segment);
        assert!(joined.words[2].boundary.segment);
    }

    #[test]
    fn test_qalqala_at_range_end() {
        let result = phonemizer()
            .phonemize(&corpus(), &PhonemizeRequest::new("112:1"))
            .unwrap();
        assert_eq!(word_strings(&result)[3], "ʔaħadQQ");
    }

    #[test]
    fn test_stop_mark_pause_is_selectable() {
        let corpus = MemoryCorpus::default().with_verse(1, 1, &["أَحَدٌۚ", "ٱللَّهُ", "ٱلصَّمَدُ"]);
        let phonemizer = phonemizer();

        let active = phonemizer
            .phonemize(
                &corpus,
                &PhonemizeRequest::new("1:1").with_stops(StopSelection::from_keys(["optional_stop"])),
            )
            .unwrap();
        assert_eq!(word_strings(&active)[0], "ʔaħadQQ");
        assert!(active.words[0].boundary.pause);
        assert_eq!(active.words[0].stop_key(), Some("optional_stop"));

        let inactive = phonemizer
            .phonemize(&corpus, &PhonemizeRequest::new("1:1"))
            .unwrap();
        assert_eq!(word_strings(&inactive)[0], "ʔaħaduni");
        assert!(!inactive.words[0].boundary.pause);
    }

    #[test]
    fn test_unknown_stop_key() {
        let request =
            PhonemizeRequest::new("1:1").with_stops(StopSelection::from_keys(["sometimes"]));
        assert_matches!(
            phonemizer().phonemize(&corpus(), &request),
            Err(PipelineError::Boundary(BoundaryError::UnknownStopKey { .. }))
        );
    }

    #[test]
    fn test_invalid_reference() {
        assert_matches!(
            phonemizer().phonemize(&corpus(), &PhonemizeRequest::new("1:1-1:2")),
            Err(PipelineError::Reference(ReferenceError::GrammarMismatch { .. }))
        );
        assert_matches!(
            phonemizer().phonemize(&corpus(), &PhonemizeRequest::new("1:5")),
            Err(PipelineError::Reference(ReferenceError::OutOfRange { .. }))
        );
    }

    #[test]
    fn test_verse_numbers_are_skipped() {
        let corpus = MemoryCorpus::default()
            .with_verse(112, 1, &["قُلْ", "هُوَ", "ٱللَّهُ", "أَحَدٌ", "١"]);
        let result = phonemizer()
            .phonemize(&corpus, &PhonemizeRequest::new("112:1"))
            .unwrap();

        assert_eq!(result.words.len(), 4);
        assert!(result.words[3].verse_end);
        assert!(result.text.contains("١"));
    }

    #[test]
    fn test_text_has_verse_markers() {
        let result = phonemizer()
            .phonemize(&corpus(), &PhonemizeRequest::new("112:1 - 112:2"))
            .unwrap();
        assert_eq!(result.text.matches('\u{FD3F}').count(), 2);
        assert!(result.text.starts_with("قُلْ هُوَ"));
    }

    #[test]
    fn test_newline_mode_sets_render() {
        let request = PhonemizeRequest::new("112:2").with_newline_mode(NewlineMode::Word);
        let result = phonemizer().phonemize(&corpus(), &request).unwrap();
        assert_eq!(result.render, RenderConfig::for_newline_mode(NewlineMode::Word));
        assert_eq!(result.phonemes_text().lines().count(), 2);
    }

    #[test]
    fn test_phonemizer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Phonemizer>();
    }

    #[test]
    fn test_output_is_deterministic() {
        let phonemizer = phonemizer();
        let request = PhonemizeRequest::new("112");
        let first = phonemizer.phonemize(&corpus(), &request).unwrap();
        let second = phonemizer.phonemize(&corpus(), &request).unwrap();
        assert_eq!(first.phonemes_flat(), second.phonemes_flat());
    }
}
