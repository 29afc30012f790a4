use scriptscan_core::{ExtractionError, PrescriptionRecord};

/// Parse the model's JSON text into a record.
///
/// Blank text is `Empty`; anything that is not schema-shaped JSON is `Parse`.
/// A surrounding ```json fence is tolerated.
pub fn parse_record(text: &str) -> Result<PrescriptionRecord, ExtractionError> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(ExtractionError::Empty);
    }
    serde_json::from_str(body).map_err(|e| ExtractionError::Parse(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
