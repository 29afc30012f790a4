//! Environment handling for config values.
//!
//! - `${VAR_NAME}` in any string leaf is replaced at load time. Only
//!   uppercase `[A-Z_][A-Z0-9_]*` names match; `$${VAR}` stays literal as `${VAR}`.
//! - A handful of well-known variables override config fields outright.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{ExtractionConfig, ScriptScanConfig, ServerConfig};

/// `${VAR}`, optionally preceded by an escaping `$`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var pattern"));

/// Checked in order; the first non-empty one supplies the API key.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];
pub const PORT_VAR: &str = "SCRIPTSCAN_PORT";
pub const BIND_VAR: &str = "SCRIPTSCAN_BIND";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree from `env`.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply the well-known overrides from `env`.
///
/// `RUST_LOG` is not copied here; the logger reads it directly and it wins
/// over `logging.level`.
pub fn apply_env_overrides_with(
    mut config: ScriptScanConfig,
    env: &HashMap<String, String>,
) -> Result<ScriptScanConfig> {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(key) = API_KEY_VARS.iter().find_map(|name| get(*name)) {
        config
            .extraction
            .get_or_insert_with(ExtractionConfig::default)
            .api_key = Some(key.to_string());
    }
    if let Some(port) = get(PORT_VAR) {
        let port: u16 = port
            .parse()
            .with_context(|| format!("{PORT_VAR}={port} is not a valid port"))?;
        config.server.get_or_insert_with(ServerConfig::default).port = Some(port);
    }
    if let Some(bind) = get(BIND_VAR) {
        config.server.get_or_insert_with(ServerConfig::default).bind = Some(bind.to_string());
    }
    Ok(config)
}
