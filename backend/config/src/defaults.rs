//! Config defaults: applies default values to parsed config.

use crate::schema::{
    ExtractionConfig, IntakeConfig, LanguageConfig, LoggingConfig, LookupConfig, ScriptScanConfig,
    ServerConfig,
};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_EXTRACTION_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_REFERENCE_LANGUAGE: &str = "English";
pub const DEFAULT_TARGET_LANGUAGE: &str = "Tamil";

pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://rximage.nlm.nih.gov/api/rximage/1/rxnav";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://www.google.com/search?tbm=isch&q=";
pub const DEFAULT_SEARCH_QUALIFIER: &str = "tablet";

/// The 10 MB upload guideline.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8787;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: ScriptScanConfig) -> ScriptScanConfig {
    let config = apply_extraction_defaults(config);
    let config = apply_language_defaults(config);
    let config = apply_lookup_defaults(config);
    let config = apply_intake_defaults(config);
    let config = apply_server_defaults(config);
    apply_logging_defaults(config)
}

fn apply_extraction_defaults(mut config: ScriptScanConfig) -> ScriptScanConfig {
    let extraction = config.extraction.get_or_insert_with(ExtractionConfig::default);
    extraction.model.get_or_insert_with(|| DEFAULT_MODEL.to_string());
    extraction
        .base_url
        .get_or_insert_with(|| DEFAULT_EXTRACTION_BASE_URL.to_string());
    extraction.timeout_secs.get_or_insert(DEFAULT_EXTRACTION_TIMEOUT_SECS);
    config
}

fn apply_language_defaults(mut config: ScriptScanConfig) -> ScriptScanConfig {
    let language = config.language.get_or_insert_with(LanguageConfig::default);
    language
        .reference_language
        .get_or_insert_with(|| DEFAULT_REFERENCE_LANGUAGE.to_string());
    language
        .target_language
        .get_or_insert_with(|| DEFAULT_TARGET_LANGUAGE.to_string());
    config
}

fn apply_lookup_defaults(mut config: ScriptScanConfig) -> ScriptScanConfig {
    let lookup = config.lookup.get_or_insert_with(LookupConfig::default);
    lookup.base_url.get_or_insert_with(|| DEFAULT_LOOKUP_BASE_URL.to_string());
    lookup.timeout_secs.get_or_insert(DEFAULT_LOOKUP_TIMEOUT_SECS);
    lookup
        .search_base_url
        .get_or_insert_with(|| DEFAULT_SEARCH_BASE_URL.to_string());
    lookup
        .search_qualifier
        .get_or_insert_with(|| DEFAULT_SEARCH_QUALIFIER.to_string());
    config
}

fn apply_intake_defaults(mut config: ScriptScanConfig) -> ScriptScanConfig {
    let intake = config.intake.get_or_insert_with(IntakeConfig::default);
    intake.max_upload_bytes.get_or_insert(DEFAULT_MAX_UPLOAD_BYTES);
    intake.enforce_limit.get_or_insert(true);
    config
}

fn apply_server_defaults(mut config: ScriptScanConfig) -> ScriptScanConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    config
}

fn apply_logging_defaults(mut config: ScriptScanConfig) -> ScriptScanConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}
