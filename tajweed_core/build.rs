// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    reference: ReferenceLimits,
    tables: TableLimits,
    rules: RuleLimits,
    corpus: CorpusLimits,
    batch: BatchLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct ReferenceLimits {
    max_reference_length: usize,
    max_component_value: u32,
}

#[derive(serde::Deserialize)]
struct TableLimits {
    max_table_file_size: u64,
    max_letter_entries: usize,
    max_override_entries: usize,
}

#[derive(serde::Deserialize)]
struct RuleLimits {
    max_rules: usize,
    max_groups: usize,
    max_neighbor_offset: i32,
}

#[derive(serde::Deserialize)]
struct CorpusLimits {
    max_corpus_file_size: u64,
}

#[derive(serde::Deserialize)]
struct BatchLimits {
    max_worker_threads: usize,
    max_requests_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_request: usize,
    max_tracked_requests: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=TAJWEED_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=TAJWEED_CONFIG_DIR");

    let profile = env::var("TAJWEED_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("TAJWEED_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the tajweed_core directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_WORKERS: usize = 256;

    if config.tables.max_table_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMITS: max_table_file_size exceeds absolute maximum");
    }

    if config.corpus.max_corpus_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMITS: max_corpus_file_size exceeds absolute maximum");
    }

    if config.batch.max_worker_threads == 0 || config.batch.max_worker_threads > ABSOLUTE_MAX_WORKERS
    {
        panic!("LIMITS: max_worker_threads must be between 1 and {}", ABSOLUTE_MAX_WORKERS);
    }

    if config.rules.max_neighbor_offset < 1 {
        panic!("LIMITS: max_neighbor_offset must be at least 1");
    }

    // "1:1:1 - 1:1:1" is the longest form the grammar needs for small components
    if config.reference.max_reference_length < 13 {
        panic!("LIMITS: max_reference_length too small for a word range");
    }

    if config.logging.max_log_events_per_request > config.logging.log_buffer_size {
        panic!("LIMITS: max_log_events_per_request exceeds log_buffer_size");
    }

    if profile == "production" && config.batch.max_requests_per_batch > 100_000 {
        panic!("PRODUCTION: max_requests_per_batch too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod reference {{
        pub const MAX_REFERENCE_LENGTH: usize = {};
        pub const MAX_COMPONENT_VALUE: u32 = {};
    }}

    pub mod tables {{
        pub const MAX_TABLE_FILE_SIZE: u64 = {};
        pub const MAX_LETTER_ENTRIES: usize = {};
        pub const MAX_OVERRIDE_ENTRIES: usize = {};
    }}

    pub mod rules {{
        pub const MAX_RULES: usize = {};
        pub const MAX_GROUPS: usize = {};
        pub const MAX_NEIGHBOR_OFFSET: i32 = {};
    }}

    pub mod corpus {{
        pub const MAX_CORPUS_FILE_SIZE: u64 = {};
    }}

    pub mod batch {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_REQUESTS_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_REQUEST: usize = {};
        pub const MAX_TRACKED_REQUESTS: usize = {};
    }}
}}
"#,
        profile,
        config.reference.max_reference_length,
        config.reference.max_component_value,
        config.tables.max_table_file_size,
        config.tables.max_letter_entries,
        config.tables.max_override_entries,
        config.rules.max_rules,
        config.rules.max_groups,
        config.rules.max_neighbor_offset,
        config.corpus.max_corpus_file_size,
        config.batch.max_worker_threads,
        config.batch.max_requests_per_batch,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_request,
        config.logging.max_tracked_requests,
    );

    fs::write(output_path, constants_code).unwrap();
}
