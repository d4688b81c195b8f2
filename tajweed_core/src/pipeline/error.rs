use crate::boundary::BoundaryError;
use crate::corpus::CorpusError;
use crate::logging::codes::{self, Code, Severity};
use crate::reference::ReferenceError;
use crate::result::ExportError;
use crate::tables::TableError;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid reference: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Stop selection rejected: {0}")]
    Boundary(#[from] BoundaryError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::Reference(e) => e.error_code(),
            PipelineError::Boundary(e) => e.error_code(),
            PipelineError::Table(e) => e.error_code(),
            PipelineError::Corpus(e) => e.error_code(),
            PipelineError::Export(e) => e.error_code(),
            PipelineError::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    /// Whether the remaining requests of a batch can still run
    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}
