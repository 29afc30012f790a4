//! Turns the loaded config into the components the commands run with.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use scriptscan_config::{config_dir, config_file_path, load_and_prepare, require_api_key, ScriptScanConfig};
use scriptscan_core::PrescriptionExtractor;
use scriptscan_lookup::{DrugImageResolver, RxImageSource, SearchLinkBuilder};
use scriptscan_media::IntakePolicy;
use scriptscan_understanding::{GeminiExtractor, LanguagePolicy};

/// The config file in effect: `--config`, else the default location.
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config_file_path(&config_dir()))
}

pub async fn load(explicit: Option<&Path>) -> Result<ScriptScanConfig> {
    load_and_prepare(&resolve_path(explicit)).await
}

pub fn language_policy(config: &ScriptScanConfig) -> LanguagePolicy {
    LanguagePolicy::for_languages(config.reference_language(), config.target_language())
}

/// The live extraction client. Fails when no API key is configured.
pub fn build_extractor(config: &ScriptScanConfig) -> Result<Arc<dyn PrescriptionExtractor>> {
    let api_key = require_api_key(config)?;
    let extractor = GeminiExtractor::new(api_key, &language_policy(config))?
        .with_model(config.model())
        .with_base_url(config.extraction_base_url())
        .with_timeout(Duration::from_secs(config.extraction_timeout_secs()))
        .context("Failed to configure the extraction client")?;
    Ok(Arc::new(extractor))
}

pub fn build_resolver(config: &ScriptScanConfig) -> DrugImageResolver {
    let source = RxImageSource::with_timeout(Duration::from_secs(config.lookup_timeout_secs()))
        .with_base_url(config.lookup_base_url());
    DrugImageResolver::new(Arc::new(source))
}

pub fn search_links(config: &ScriptScanConfig) -> SearchLinkBuilder {
    SearchLinkBuilder::new(config.search_base_url(), config.search_qualifier())
}

pub fn intake_policy(config: &ScriptScanConfig) -> IntakePolicy {
    IntakePolicy {
        max_bytes: config.max_upload_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptscan_config::schema::{IntakeConfig, LookupConfig};
    use scriptscan_understanding::{FieldLanguage, PrescriptionField};

    #[test]
    fn explicit_path_wins() {
        assert_eq!(resolve_path(Some(Path::new("/tmp/x.yaml"))), PathBuf::from("/tmp/x.yaml"));
        assert!(resolve_path(None).ends_with("config.yaml"));
    }

    #[test]
    fn extractor_requires_api_key() {
        let err = build_extractor(&ScriptScanConfig::default()).err().unwrap();
        assert!(err.to_string().contains("extraction.apiKey"));
    }

    #[test]
    fn language_policy_follows_config() {
        let policy = language_policy(&ScriptScanConfig::default());
        assert_eq!(policy.language_name(PrescriptionField::Dosage), Some("Tamil"));
        assert_eq!(policy.language_for(PrescriptionField::BrandName), FieldLanguage::Original);
    }

    #[test]
    fn lookup_and_intake_settings() {
        let config = ScriptScanConfig {
            lookup: Some(LookupConfig {
                search_qualifier: Some("capsule".into()),
                ..Default::default()
            }),
            intake: Some(IntakeConfig {
                enforce_limit: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            search_links(&config).link_for("Omez"),
            "https://www.google.com/search?tbm=isch&q=Omez%20capsule"
        );
        assert_eq!(intake_policy(&config), IntakePolicy::advisory());
    }
}
