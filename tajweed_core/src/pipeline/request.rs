use crate::boundary::StopSelection;
use crate::result::NewlineMode;
use serde::{Deserialize, Serialize};

/// One phonemization request
///
/// Deserializes from `{"reference": "112", "stops": ["verse"]}` with the
/// remaining fields defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhonemizeRequest {
    pub reference: String,
    #[serde(default)]
    pub stops: StopSelection,
    #[serde(default)]
    pub newline_mode: NewlineMode,
}

impl PhonemizeRequest {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::default()
        }
    }

    pub fn with_stops(mut self, stops: StopSelection) -> Self {
        self.stops = stops;
        self
    }

    pub fn with_newline_mode(mut self, mode: NewlineMode) -> Self {
        self.newline_mode = mode;
        self
    }
}
