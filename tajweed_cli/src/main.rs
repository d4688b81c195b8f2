//! # Tajweed CLI
//!
//! Phonemize a single reference or a batch file against a word-by-word
//! corpus, printing rendered text, JSON or CSV.

mod bridge;

use bridge::LogBridge;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tajweed_core::batch::{self, BatchConfig};
use tajweed_core::config::runtime::{LogLevel, LoggingPreferences};
use tajweed_core::logging::{self, LoggingService};
use tajweed_core::pipeline::{self, PhonemizeRequest, Phonemizer};
use tajweed_core::result::{export, ExportFormat, ExportSplit, NewlineMode, PhonemizeResult};
use tajweed_core::{MemoryCorpus, StopSelection, Tables};

#[derive(Parser)]
#[command(name = "tajweed")]
#[command(about = "Convert Qur'anic references into Tajweed-aware phoneme sequences")]
#[command(version)]
struct Cli {
    /// Reference such as `1:1`, `112` or `44:43 - 44:44`
    #[arg(required_unless_present_any = ["batch", "info"])]
    reference: Option<String>,

    /// Word-by-word corpus JSON
    #[arg(short, long, required_unless_present = "info")]
    corpus: Option<PathBuf>,

    /// Directory with symbols.toml, phonemes.toml and rules.toml
    #[arg(short, long)]
    tables: Option<PathBuf>,

    /// Comma-separated stop keys that pause recitation; empty disables all
    #[arg(short, long)]
    stops: Option<String>,

    /// Line breaks in text output
    #[arg(short, long, default_value = "verse")]
    newline: NewlineArg,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Row granularity for JSON and CSV output
    #[arg(long, default_value = "word")]
    split: SplitArg,

    /// File with one reference or JSON request per line
    #[arg(short, long, conflicts_with = "reference")]
    batch: Option<PathBuf>,

    /// Worker threads for batch mode
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Stop a batch at the first failed request
    #[arg(long)]
    fail_fast: bool,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print pipeline capabilities and exit
    #[arg(long)]
    info: bool,

    /// Debug-level diagnostics
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum NewlineArg {
    Verse,
    Word,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum SplitArg {
    Word,
    Verse,
    Both,
}

impl From<NewlineArg> for NewlineMode {
    fn from(arg: NewlineArg) -> Self {
        match arg {
            NewlineArg::Verse => NewlineMode::Verse,
            NewlineArg::Word => NewlineMode::Word,
        }
    }
}

impl From<SplitArg> for ExportSplit {
    fn from(arg: SplitArg) -> Self {
        match arg {
            SplitArg::Word => ExportSplit::Word,
            SplitArg::Verse => ExportSplit::Verse,
            SplitArg::Both => ExportSplit::Both,
        }
    }
}

impl OutputFormat {
    fn export_format(self) -> Option<ExportFormat> {
        match self {
            OutputFormat::Text => None,
            OutputFormat::Json => Some(ExportFormat::Json),
            OutputFormat::Csv => Some(ExportFormat::Csv),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_diagnostics(&cli);

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn init_diagnostics(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut preferences = LoggingPreferences::default();
    if cli.verbose {
        preferences.min_log_level = LogLevel::Debug;
    } else if cli.quiet {
        preferences.min_log_level = LogLevel::Warning;
    }

    if let Err(e) = logging::config::init_runtime_preferences(preferences) {
        warn!("{}", e);
    }

    // JSON lines go straight to stderr; everything else goes through env_logger
    let installed = if logging::config::use_structured_logging() {
        logging::init_global_logging()
    } else {
        logging::config::validate_config().and_then(|_| {
            let min_level = logging::config::get_min_log_level();
            let service = LoggingService::new(Arc::new(LogBridge), min_level);
            logging::init_global_logging_with_service(Arc::new(service))
        })
    };

    if let Err(e) = installed {
        warn!("Core logging unavailable: {}", e);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.info {
        println!("{}", pipeline::get_pipeline_info().report());
        return Ok(());
    }

    pipeline::validate_pipeline()?;
    if let Some(format) = cli.format.export_format() {
        export::validate_export(format, cli.split.into())?;
    }

    let tables = match &cli.tables {
        Some(dir) => {
            info!("Loading tables from {}", dir.display());
            Tables::load_dir(dir)?
        }
        None => Tables::builtin()?,
    };
    let phonemizer = Phonemizer::new(Arc::new(tables));

    let corpus_path = cli.corpus.as_deref().ok_or("--corpus is required")?;
    info!("Loading corpus from {}", corpus_path.display());
    let corpus = MemoryCorpus::load(corpus_path)?;

    let (output, failures) = match (&cli.batch, &cli.reference) {
        (Some(path), _) => run_batch(cli, &phonemizer, &corpus, path)?,
        (None, Some(reference)) => {
            let request = build_request(cli, reference);
            let result = phonemizer.phonemize(&corpus, &request)?;
            (format_result(cli, &result)?, 0)
        }
        (None, None) => return Err("a reference or --batch file is required".into()),
    };

    write_output(cli.output.as_deref(), &output)?;

    if failures > 0 {
        return Err(format!("{} batch request(s) failed", failures).into());
    }
    Ok(())
}

fn stop_override(cli: &Cli) -> Option<StopSelection> {
    cli.stops.as_deref().map(StopSelection::parse_list)
}

fn build_request(cli: &Cli, reference: &str) -> PhonemizeRequest {
    PhonemizeRequest::new(reference)
        .with_stops(stop_override(cli).unwrap_or_default())
        .with_newline_mode(cli.newline.into())
}

fn format_result(cli: &Cli, result: &PhonemizeResult) -> Result<String, Box<dyn std::error::Error>> {
    match cli.format.export_format() {
        Some(format) => Ok(export::export(result, format, cli.split.into())?),
        None => Ok(format!("{}\n{}\n", result.text, result.phonemes_text())),
    }
}

fn run_batch(
    cli: &Cli,
    phonemizer: &Phonemizer,
    corpus: &MemoryCorpus,
    path: &Path,
) -> Result<(String, usize), Box<dyn std::error::Error>> {
    let mut requests = batch::read_requests(path)?;

    // Command-line stops replace the default selection, never an explicit one
    if let Some(stops) = stop_override(cli) {
        for request in requests.iter_mut() {
            if request.stops == StopSelection::default() {
                request.stops = stops.clone();
            }
        }
    }

    let config = BatchConfig {
        max_threads: cli.threads.unwrap_or_else(num_cpus::get),
        progress_reporting: cli.verbose,
        fail_fast: cli.fail_fast,
    };
    debug!("Batch of {} requests on {} threads", requests.len(), config.effective_threads());

    let results = batch::process_batch(phonemizer, corpus, &requests, &config)?;

    for (index, reference, error) in &results.failed {
        eprintln!("request {} ({}): {}", index + 1, reference, error);
    }
    info!("{}", results.summary());

    let started = chrono::Utc::now().to_rfc3339();
    let mut output = String::new();

    if cli.format == OutputFormat::Json {
        let mut items = Vec::with_capacity(results.successful.len());
        for (_, result) in &results.successful {
            let body = export::export(result, ExportFormat::Json, cli.split.into())?;
            items.push(serde_json::json!({
                "ref": result.reference,
                "rows": serde_json::from_str::<serde_json::Value>(&body)?,
            }));
        }
        let envelope = serde_json::json!({
            "generated_at": started,
            "succeeded": results.success_count(),
            "failed": results.failure_count(),
            "results": items,
        });
        output.push_str(&serde_json::to_string_pretty(&envelope)?);
        output.push('\n');
    } else {
        for (_, result) in &results.successful {
            if cli.format == OutputFormat::Text {
                output.push_str(&format!("# {}\n", result.reference));
            }
            output.push_str(&format_result(cli, result)?);
        }
    }

    if results.failure_count() > 0 {
        warn!(
            "{} of {} requests failed",
            results.failure_count(),
            results.requests_submitted
        );
        if cli.verbose {
            eprintln!("{}", logging::format_request_report());
        }
    }

    Ok((output, results.failure_count()))
}

fn write_output(path: Option<&Path>, content: &str) -> std::io::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)?;
            info!("Wrote {} bytes to {}", content.len(), path.display());
            Ok(())
        }
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
