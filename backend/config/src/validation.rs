//! Config validation with user-friendly error messages.

use std::net::IpAddr;

use crate::schema::ScriptScanConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
///
/// A missing API key is not checked here; see [`require_api_key`].
pub fn validate(config: &ScriptScanConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_extraction(config, &mut report);
    validate_language(config, &mut report);
    validate_lookup(config, &mut report);
    validate_intake(config, &mut report);
    validate_server(config, &mut report);
    report
}

/// The API key, for commands that call the extraction service.
pub fn require_api_key(config: &ScriptScanConfig) -> Result<&str, ConfigValidationError> {
    config.api_key().ok_or_else(|| ConfigValidationError {
        path: "extraction.apiKey".into(),
        message: "API key is required; set GEMINI_API_KEY or extraction.apiKey".into(),
    })
}

fn check_url(report: &mut ValidationReport, path: &str, url: &str) {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        report.error(path, format!("'{url}' is not an http(s) URL"));
    }
}

fn validate_extraction(config: &ScriptScanConfig, report: &mut ValidationReport) {
    if config.extraction_timeout_secs() == 0 {
        report.error("extraction.timeoutSecs", "timeoutSecs must be > 0");
    }
    check_url(report, "extraction.baseUrl", config.extraction_base_url());
}

fn validate_language(config: &ScriptScanConfig, report: &mut ValidationReport) {
    if config.reference_language().eq_ignore_ascii_case(config.target_language()) {
        report.warn(
            "language.targetLanguage",
            "Target language equals the reference language; every field will use one language",
        );
    }
}

fn validate_lookup(config: &ScriptScanConfig, report: &mut ValidationReport) {
    if config.lookup_timeout_secs() == 0 {
        report.error("lookup.timeoutSecs", "timeoutSecs must be > 0");
    }
    check_url(report, "lookup.baseUrl", config.lookup_base_url());
    check_url(report, "lookup.searchBaseUrl", config.search_base_url());
}

fn validate_intake(config: &ScriptScanConfig, report: &mut ValidationReport) {
    if config.max_upload_bytes() == Some(0) {
        report.error("intake.maxUploadBytes", "maxUploadBytes must be > 0");
    }
}

fn validate_server(config: &ScriptScanConfig, report: &mut ValidationReport) {
    if config.port() == 0 {
        report.error("server.port", "port must be > 0");
    } else if config.port() < 1024 {
        report.warn(
            "server.port",
            format!("Port {} requires elevated privileges; consider using a port >= 1024", config.port()),
        );
    }
    if config.bind().parse::<IpAddr>().is_err() {
        report.error("server.bind", format!("'{}' is not an IP address", config.bind()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ExtractionConfig, ServerConfig};

    #[test]
    fn empty_config_is_valid() {
        let report = validate(&ScriptScanConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn zero_timeout_and_port_are_errors() {
        let cfg = ScriptScanConfig {
            extraction: Some(ExtractionConfig {
                timeout_secs: Some(0),
                ..Default::default()
            }),
            server: Some(ServerConfig {
                port: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["extraction.timeoutSecs", "server.port"]);
    }

    #[test]
    fn bad_bind_address_is_error() {
        let cfg = ScriptScanConfig {
            server: Some(ServerConfig {
                bind: Some("localhost:80".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(!validate(&cfg).is_valid());
    }

    #[test]
    fn api_key_is_required_on_demand() {
        let err = require_api_key(&ScriptScanConfig::default()).unwrap_err();
        assert_eq!(err.path, "extraction.apiKey");

        let cfg = ScriptScanConfig {
            extraction: Some(ExtractionConfig {
                api_key: Some("k".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(require_api_key(&cfg).unwrap(), "k");
    }
}
