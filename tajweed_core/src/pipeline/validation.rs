use crate::logging::codes;
use crate::tables::Tables;

/// Codes each stage reports failures with
const STAGE_CODES: [(&str, codes::Code); 6] = [
    ("reference", codes::reference::GRAMMAR_MISMATCH),
    ("boundary", codes::stops::UNKNOWN_STOP_KEY),
    ("tables", codes::tables::MISSING_MAPPING),
    ("rules", codes::rules::INVALID_RULE_TABLE),
    ("corpus", codes::corpus::MISSING_WORD),
    ("export", codes::export::UNSUPPORTED_SPLIT),
];

/// Validate that the pipeline is properly configured
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    for (stage, code) in STAGE_CODES {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Stage '{}' has no metadata for code {}", stage, code));
        }
    }

    let tables = Tables::builtin().map_err(|e| format!("Built-in tables are invalid: {}", e))?;

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "stages_validated" => STAGE_CODES.len(),
        "letters" => tables.symbols.letters().len(),
        "rules" => tables.rules.rules().len()
    );

    Ok(())
}
