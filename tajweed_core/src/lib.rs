// Internal modules
pub mod batch;
pub mod boundary;
pub mod config;
pub mod corpus;
pub mod location;
#[macro_use]
pub mod logging;
pub mod phonemes;
pub mod pipeline;
pub mod reference;
pub mod result;
pub mod symbols;
pub mod tables;
pub mod tajweed;
pub mod word;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use boundary::{Boundary, StopSelection, StopTable};
pub use corpus::{Corpus, CorpusMetadata, MemoryCorpus};
pub use location::Location;
pub use pipeline::{PhonemizeRequest, Phonemizer, PipelineError};
pub use result::{NewlineMode, PhonemizeResult, RenderConfig};
pub use tables::Tables;
