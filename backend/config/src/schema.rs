//! ScriptScan runtime configuration schema.
//!
//! Every field is optional on disk; `apply_all_defaults` fills the gaps and
//! the accessors below fall back to the same defaults.

use serde::{Deserialize, Serialize};

use crate::defaults::*;

/// Root configuration (`config.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptScanConfig {
    /// Multimodal extraction service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionConfig>,

    /// Language routing for extracted fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageConfig>,

    /// Drug image lookup and the manual search fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupConfig>,

    /// Upload limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake: Option<IntakeConfig>,

    /// Local app listener
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfig {
    /// Language for generic names, diagnosis and advice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_language: Option<String>,
    /// Language for dosage, frequency, duration, instructions and type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_qualifier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
    /// `false` shows the size guideline without rejecting larger files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce_limit: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Level or `EnvFilter` directive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for the daily NDJSON log. Console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ScriptScanConfig {
    pub fn api_key(&self) -> Option<&str> {
        self.extraction.as_ref().and_then(|e| non_blank(&e.api_key))
    }

    pub fn model(&self) -> &str {
        self.extraction
            .as_ref()
            .and_then(|e| non_blank(&e.model))
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn extraction_base_url(&self) -> &str {
        self.extraction
            .as_ref()
            .and_then(|e| non_blank(&e.base_url))
            .unwrap_or(DEFAULT_EXTRACTION_BASE_URL)
    }

    pub fn extraction_timeout_secs(&self) -> u64 {
        self.extraction
            .as_ref()
            .and_then(|e| e.timeout_secs)
            .unwrap_or(DEFAULT_EXTRACTION_TIMEOUT_SECS)
    }

    pub fn reference_language(&self) -> &str {
        self.language
            .as_ref()
            .and_then(|l| non_blank(&l.reference_language))
            .unwrap_or(DEFAULT_REFERENCE_LANGUAGE)
    }

    pub fn target_language(&self) -> &str {
        self.language
            .as_ref()
            .and_then(|l| non_blank(&l.target_language))
            .unwrap_or(DEFAULT_TARGET_LANGUAGE)
    }

    pub fn lookup_base_url(&self) -> &str {
        self.lookup
            .as_ref()
            .and_then(|l| non_blank(&l.base_url))
            .unwrap_or(DEFAULT_LOOKUP_BASE_URL)
    }

    pub fn lookup_timeout_secs(&self) -> u64 {
        self.lookup
            .as_ref()
            .and_then(|l| l.timeout_secs)
            .unwrap_or(DEFAULT_LOOKUP_TIMEOUT_SECS)
    }

    pub fn search_base_url(&self) -> &str {
        self.lookup
            .as_ref()
            .and_then(|l| non_blank(&l.search_base_url))
            .unwrap_or(DEFAULT_SEARCH_BASE_URL)
    }

    /// May be empty: the search link then uses the bare name.
    pub fn search_qualifier(&self) -> &str {
        self.lookup
            .as_ref()
            .and_then(|l| l.search_qualifier.as_deref())
            .unwrap_or(DEFAULT_SEARCH_QUALIFIER)
    }

    /// `None` when the limit is advisory only.
    pub fn max_upload_bytes(&self) -> Option<usize> {
        let intake = self.intake.as_ref();
        if intake.and_then(|i| i.enforce_limit) == Some(false) {
            return None;
        }
        Some(
            intake
                .and_then(|i| i.max_upload_bytes)
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        )
    }

    pub fn bind(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| non_blank(&s.bind))
            .unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.server.as_ref().and_then(|s| s.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| non_blank(&l.level))
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| non_blank(&l.dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
extraction:
  apiKey: abc
  timeoutSecs: 30
language:
  targetLanguage: Hindi
intake:
  enforceLimit: false
server:
  port: 9000
"#;
        let cfg: ScriptScanConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.api_key(), Some("abc"));
        assert_eq!(cfg.extraction_timeout_secs(), 30);
        assert_eq!(cfg.target_language(), "Hindi");
        assert_eq!(cfg.reference_language(), "English");
        assert_eq!(cfg.max_upload_bytes(), None);
        assert_eq!(cfg.port(), 9000);
        assert_eq!(cfg.bind(), DEFAULT_BIND);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = ScriptScanConfig::default();
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.model(), "gemini-2.5-flash");
        assert_eq!(cfg.max_upload_bytes(), Some(10 * 1024 * 1024));
        assert_eq!(cfg.search_qualifier(), "tablet");
        assert_eq!(cfg.log_dir(), None);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = ScriptScanConfig {
            extraction: Some(ExtractionConfig {
                api_key: Some("  ".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(cfg.api_key(), None);
    }
}
