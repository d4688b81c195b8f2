//! Batch processing of phonemize requests
//!
//! Runs independent requests sequentially or across scoped worker threads.
//! Every request gets its own logging context; results come back in
//! submission order regardless of which worker produced them.

use crate::config::compile_time::batch::{MAX_REQUESTS_PER_BATCH, MAX_WORKER_THREADS};
use crate::corpus::Corpus;
use crate::logging::codes;
use crate::pipeline::{PhonemizeRequest, Phonemizer, PipelineError};
use crate::result::PhonemizeResult;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub progress_reporting: bool,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(1),
            progress_reporting: false,
            fail_fast: false,
        }
    }
}

impl BatchConfig {
    /// Thread count clamped to the compiled-in maximum
    pub fn effective_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }
}

/// Batch processing results, ordered by request index
#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful: Vec<(usize, PhonemizeResult)>,
    pub failed: Vec<(usize, String, PipelineError)>,
    pub processing_duration: Duration,
    pub requests_submitted: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn requests_processed(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn success_rate(&self) -> f64 {
        let processed = self.requests_processed();
        if processed == 0 {
            0.0
        } else {
            self.successful.len() as f64 / processed as f64
        }
    }

    pub fn add_success(&mut self, index: usize, result: PhonemizeResult) {
        self.successful.push((index, result));
    }

    pub fn add_failure(&mut self, index: usize, reference: &str, error: PipelineError) {
        self.failed.push((index, reference.to_string(), error));
    }

    fn sort(&mut self) {
        self.successful.sort_by_key(|(index, _)| *index);
        self.failed.sort_by_key(|(index, _, _)| *index);
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch completed: {} of {} requests processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.requests_processed(),
            self.requests_submitted,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Batch is empty")]
    EmptyBatch,

    #[error("Too many requests: {count} (max: {max})")]
    TooManyRequests { count: usize, max: usize },

    #[error("Failed to read batch file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Invalid request on line {line}: {message}")]
    InvalidRequest { line: usize, message: String },

    #[error("Worker thread error: {message}")]
    ThreadError { message: String },
}

// ============================================================================
// REQUEST FILES
// ============================================================================

/// Parse a batch file: one request per line
///
/// A line is either a bare reference (default stops and newline mode) or a
/// JSON request object. Blank lines and `#` comments are skipped.
pub fn parse_requests(content: &str) -> Result<Vec<PhonemizeRequest>, BatchError> {
    let mut requests = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let request = if line.starts_with('{') {
            serde_json::from_str(line).map_err(|e| BatchError::InvalidRequest {
                line: number + 1,
                message: e.to_string(),
            })?
        } else {
            PhonemizeRequest::new(line)
        };
        requests.push(request);
    }

    Ok(requests)
}

pub fn read_requests(path: &Path) -> Result<Vec<PhonemizeRequest>, BatchError> {
    let content = fs::read_to_string(path).map_err(|e| BatchError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let requests = parse_requests(&content)?;

    crate::log_info!("Batch file read",
        "path" => path.display(),
        "requests" => requests.len()
    );

    Ok(requests)
}

fn check_batch_size(requests: &[PhonemizeRequest]) -> Result<(), BatchError> {
    if requests.is_empty() {
        return Err(BatchError::EmptyBatch);
    }
    if requests.len() > MAX_REQUESTS_PER_BATCH {
        crate::log_error!(codes::batch::BATCH_TOO_LARGE, "Batch exceeds request limit",
            "requests" => requests.len(),
            "max" => MAX_REQUESTS_PER_BATCH
        );
        return Err(BatchError::TooManyRequests {
            count: requests.len(),
            max: MAX_REQUESTS_PER_BATCH,
        });
    }
    Ok(())
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

pub fn process_sequential<C: Corpus>(
    phonemizer: &Phonemizer,
    corpus: &C,
    requests: &[PhonemizeRequest],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    check_batch_size(requests)?;
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch processing", "requests" => requests.len());

    let mut results = BatchResults::new();
    results.requests_submitted = requests.len();

    for (index, request) in requests.iter().enumerate() {
        if config.progress_reporting {
            eprintln!(
                "Processing request {} of {}: {}",
                index + 1,
                requests.len(),
                request.reference
            );
        }

        match phonemizer.phonemize_with_id(corpus, request, index) {
            Ok(result) => results.add_success(index, result),
            Err(error) => {
                let halt = config.fail_fast || error.requires_halt();
                results.add_failure(index, &request.reference, error);

                if halt {
                    crate::log_warning!("Stopping batch after failure",
                        "request" => index,
                        "reference" => request.reference
                    );
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, 1);

    Ok(results)
}

/// Process requests on scoped worker threads
///
/// Requests are split into contiguous slices, one per worker.
pub fn process_parallel<C: Corpus>(
    phonemizer: &Phonemizer,
    corpus: &C,
    requests: &[PhonemizeRequest],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    check_batch_size(requests)?;
    let start_time = Instant::now();
    let threads = config.effective_threads().min(requests.len());
    let per_thread = requests.len().div_ceil(threads);

    crate::log_info!("Starting parallel batch processing",
        "requests" => requests.len(),
        "threads" => threads,
        "per_thread" => per_thread
    );

    let collected = Mutex::new(BatchResults::new());
    let stop = AtomicBool::new(false);

    let joined: Vec<thread::Result<()>> = thread::scope(|scope| {
        let handles: Vec<_> = requests
            .chunks(per_thread)
            .enumerate()
            .map(|(chunk_id, chunk)| {
                let collected = &collected;
                let stop = &stop;
                scope.spawn(move || {
                    for (offset, request) in chunk.iter().enumerate() {
                        if stop.load(Ordering::Relaxed) {
                            break;
                        }

                        let index = chunk_id * per_thread + offset;
                        let outcome = phonemizer.phonemize_with_id(corpus, request, index);

                        let mut guard = collected.lock().unwrap_or_else(|p| p.into_inner());
                        match outcome {
                            Ok(result) => guard.add_success(index, result),
                            Err(error) => {
                                if config.fail_fast || error.requires_halt() {
                                    stop.store(true, Ordering::Relaxed);
                                }
                                guard.add_failure(index, &request.reference, error);
                            }
                        }
                    }
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join()).collect()
    });

    if joined.iter().any(|j| j.is_err()) {
        crate::log_error!(codes::batch::WORKER_PANIC, "Worker thread panicked",
            "threads" => threads
        );
        return Err(BatchError::ThreadError {
            message: "Worker thread panicked during processing".to_string(),
        });
    }

    let mut results = collected.into_inner().unwrap_or_else(|p| p.into_inner());
    results.requests_submitted = requests.len();
    results.sort();
    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, threads);

    Ok(results)
}

fn log_batch_complete(results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch processing completed",
        "requests_processed" => results.requests_processed(),
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Process a batch, choosing sequential or parallel mode from the config
pub fn process_batch<C: Corpus>(
    phonemizer: &Phonemizer,
    corpus: &C,
    requests: &[PhonemizeRequest],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.effective_threads() == 1 || requests.len() == 1 {
        process_sequential(phonemizer, corpus, requests, config)
    } else {
        process_parallel(phonemizer, corpus, requests, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::StopSelection;
    use crate::corpus::MemoryCorpus;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn corpus() -> MemoryCorpus {
        MemoryCorpus::default()
            .with_verse(112, 1, &["قُلْ", "هُوَ", "ٱللَّهُ", "أَحَدٌ"])
            .with_verse(112, 2, &["ٱللَّهُ", "ٱلصَّمَدُ"])
            .with_verse(112, 3, &["لَمْ", "يَلِدْ", "وَلَمْ", "يُولَدْ"])
    }

    fn requests() -> Vec<PhonemizeRequest> {
        vec![
            PhonemizeRequest::new("112:1"),
            PhonemizeRequest::new("112:9"),
            PhonemizeRequest::new("112:2"),
            PhonemizeRequest::new("112:3").with_stops(StopSelection::none()),
            PhonemizeRequest::new("112"),
        ]
    }

    #[test]
    fn test_parse_requests() {
        let content = "# sura 112\n112:1\n\n{\"reference\": \"112:2\", \"stops\": []}\n";
        let requests = parse_requests(content).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].reference, "112:1");
        assert!(requests[1].stops.is_empty());
    }

    #[test]
    fn test_parse_requests_reports_line() {
        assert_matches!(
            parse_requests("112\n{\"reference\": 5}\n"),
            Err(BatchError::InvalidRequest { line: 2, .. })
        );
    }

    #[test]
    fn test_read_requests_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1:1").unwrap();
        writeln!(file, "112").unwrap();
        assert_eq!(read_requests(file.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_sequential_batch() {
        let phonemizer = Phonemizer::builtin().unwrap();
        let config = BatchConfig {
            max_threads: 1,
            ..BatchConfig::default()
        };

        let results = process_batch(&phonemizer, &corpus(), &requests(), &config).unwrap();
        assert_eq!(results.success_count(), 4);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.failed[0].0, 1);
        assert_eq!(results.failed[0].1, "112:9");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let phonemizer = Phonemizer::builtin().unwrap();
        let corpus = corpus();
        let requests = requests();

        let sequential = process_sequential(
            &phonemizer,
            &corpus,
            &requests,
            &BatchConfig::default(),
        )
        .unwrap();
        let parallel = process_parallel(
            &phonemizer,
            &corpus,
            &requests,
            &BatchConfig {
                max_threads: 3,
                ..BatchConfig::default()
            },
        )
        .unwrap();

        let indices: Vec<usize> = parallel.successful.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2, 3, 4]);
        for ((_, a), (_, b)) in sequential.successful.iter().zip(&parallel.successful) {
            assert_eq!(a.phonemes_flat(), b.phonemes_flat());
        }
    }

    #[test]
    fn test_fail_fast_stops_sequential_batch() {
        let phonemizer = Phonemizer::builtin().unwrap();
        let config = BatchConfig {
            max_threads: 1,
            fail_fast: true,
            ..BatchConfig::default()
        };

        let results = process_batch(&phonemizer, &corpus(), &requests(), &config).unwrap();
        assert_eq!(results.requests_processed(), 2);
        assert_eq!(results.requests_submitted, 5);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let phonemizer = Phonemizer::builtin().unwrap();
        assert_matches!(
            process_batch(&phonemizer, &corpus(), &[], &BatchConfig::default()),
            Err(BatchError::EmptyBatch)
        );
    }

    #[test]
    fn test_batch_results_rates() {
        let results = BatchResults::new();
        assert_eq!(results.success_rate(), 0.0);
        assert_eq!(results.requests_processed(), 0);
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert!(config.max_threads >= 1);
        assert!(config.effective_threads() <= MAX_WORKER_THREADS);
        assert!(!config.fail_fast);
    }
}
