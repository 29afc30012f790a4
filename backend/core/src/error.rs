use thiserror::Error;

/// Failures of the extraction service call.
///
/// None of these are retried; the caller surfaces the message and keeps its
/// previous state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("extraction service error: {0}")]
    Service(String),

    #[error("extraction service timed out")]
    Timeout,

    #[error("no data returned")]
    Empty,

    #[error("parse failure: {0}")]
    Parse(String),
}

/// Failures of a single drug image query. Never leaves the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("lookup transport error: {0}")]
    Transport(String),

    #[error("lookup service returned HTTP {0}")]
    Status(u16),

    #[error("lookup response could not be parsed: {0}")]
    Parse(String),
}

/// Top-level error taxonomy for one analysis attempt.
#[derive(Debug, Error)]
pub enum ScriptScanError {
    /// No usable file was supplied. Callers treat this as a no-op guard.
    #[error("no image selected: {0}")]
    Input(String),

    /// The local image could not be read or encoded.
    #[error("error reading file: {0}")]
    Read(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl ScriptScanError {
    /// Whether the error should be shown in the error panel.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, ScriptScanError::Read(_) | ScriptScanError::Extraction(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_messages() {
        assert_eq!(ExtractionError::Empty.to_string(), "no data returned");
        assert_eq!(
            ExtractionError::Parse("expected value".into()).to_string(),
            "parse failure: expected value"
        );
    }

    #[test]
    fn visibility_follows_taxonomy() {
        assert!(!ScriptScanError::Input("empty".into()).is_user_visible());
        assert!(ScriptScanError::Read("denied".into()).is_user_visible());
        assert!(ScriptScanError::from(ExtractionError::Timeout).is_user_visible());
        assert!(!ScriptScanError::from(LookupError::Status(500)).is_user_visible());
    }
}
