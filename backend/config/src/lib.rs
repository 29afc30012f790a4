//! `scriptscan-config`: ScriptScan runtime configuration.
//!
//! Provides:
//! - Typed config schema
//! - YAML loading from `~/.scriptscan/config.yaml`
//! - `${ENV_VAR}` substitution and well-known env overrides
//! - Default value application
//! - Validation
//! - Redaction for display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides_with, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config};
pub use redact::{collect_redacted_paths, redact};
pub use schema::ScriptScanConfig;
pub use validation::{require_api_key, validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply overrides and defaults, and validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<ScriptScanConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_and_prepare_with(path, &env).await
}

/// [`load_and_prepare`] against a provided environment.
pub async fn load_and_prepare_with(path: &Path, env: &HashMap<String, String>) -> Result<ScriptScanConfig> {
    let raw_config = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;
    let config: ScriptScanConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides_with(config, env)?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if let Some(first) = report.errors.first() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        bail!("{first} ({} error(s) in {})", report.errors.len(), path.display());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::tests::write_temp;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn full_pipeline() {
        let path = write_temp(
            "pipeline",
            "extraction:\n  apiKey: ${RX_KEY}\nserver:\n  port: 9000\n",
        )
        .await;
        let cfg = load_and_prepare_with(&path, &env(&[("RX_KEY", "from-env"), ("SCRIPTSCAN_PORT", "9100")]))
            .await
            .unwrap();
        assert_eq!(cfg.api_key(), Some("from-env"));
        assert_eq!(cfg.port(), 9100);
        assert_eq!(cfg.model(), "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn validation_errors_fail_loading() {
        let path = write_temp("zero-timeout", "lookup:\n  timeoutSecs: 0\n").await;
        let err = load_and_prepare_with(&path, &HashMap::new()).await.unwrap_err();
        assert!(err.to_string().contains("lookup.timeoutSecs"));
    }

    #[tokio::test]
    async fn missing_api_key_is_not_a_load_error() {
        let path = write_temp("no-key", "logging:\n  level: debug\n").await;
        let cfg = load_and_prepare_with(&path, &HashMap::new()).await.unwrap();
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.log_level(), "debug");
    }
}
