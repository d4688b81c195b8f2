use crate::config::compile_time::{batch, reference};
use crate::config::build_info;

/// Information about pipeline capabilities
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub pipeline_stages: Vec<&'static str>,
    pub build_profile: &'static str,
    pub max_reference_length: usize,
    pub max_worker_threads: usize,
    pub max_requests_per_batch: usize,
    pub export_formats: Vec<&'static str>,
    pub tradition: &'static str,
}

impl PipelineInfo {
    pub fn report(&self) -> String {
        format!(
            "Tajweed Phonemizer Pipeline:\n\
             - Stages: {}\n\
             - Build Profile: {}\n\
             - Max Reference Length: {}\n\
             - Max Worker Threads: {}\n\
             - Max Requests Per Batch: {}\n\
             - Export Formats: {}\n\
             - Reading: {}",
            self.pipeline_stages.join(" -> "),
            self.build_profile,
            self.max_reference_length,
            self.max_worker_threads,
            self.max_requests_per_batch,
            self.export_formats.join(", "),
            self.tradition
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{}-stage phonemizer ({} reading, {} profile)",
            self.pipeline_stages.len(),
            self.tradition,
            self.build_profile
        )
    }
}

/// Get pipeline capabilities information
pub fn get_pipeline_info() -> PipelineInfo {
    PipelineInfo {
        pipeline_stages: vec![
            "reference",
            "symbols",
            "boundary",
            "phonemes",
            "tajweed",
            "result",
        ],
        build_profile: build_info::profile(),
        max_reference_length: reference::MAX_REFERENCE_LENGTH,
        max_worker_threads: batch::MAX_WORKER_THREADS,
        max_requests_per_batch: batch::MAX_REQUESTS_PER_BATCH,
        export_formats: vec!["json", "csv"],
        tradition: "Hafs",
    }
}
