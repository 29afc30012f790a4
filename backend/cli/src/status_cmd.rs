//! `scriptscan status`: asks a running server how it is doing.

use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use scriptscan_config::ScriptScanConfig;

use crate::terminal_output::{note_success, note_warn, render_table, Column, Style};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: String,
    version: String,
    uptime_seconds: u64,
    extractor: String,
    image_source: String,
    analyzing: bool,
}

/// Where a server started from this config would be listening.
pub fn health_url(config: &ScriptScanConfig) -> String {
    let host = match config.bind() {
        "0.0.0.0" => "127.0.0.1",
        "::" => "[::1]",
        other => other,
    };
    format!("http://{host}:{}/api/health", config.port())
}

pub async fn run(config: &ScriptScanConfig) -> Result<()> {
    let url = health_url(config);
    let client = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(_) => {
            note_warn(&format!("ScriptScan is not running at {url}"));
            return Ok(());
        }
    };
    let health: Health = response.error_for_status()?.json().await?;

    note_success(&format!("ScriptScan {} is {}", health.version, health.status));
    let rows = vec![
        vec!["Extractor".to_string(), health.extractor],
        vec!["Image source".to_string(), health.image_source],
        vec!["Analyzing".to_string(), if health.analyzing { "yes" } else { "no" }.to_string()],
        vec!["Uptime".to_string(), format!("{}s", health.uptime_seconds)],
    ];
    print!(
        "{}",
        render_table(&[Column::left("Field"), Column::left("Value")], &rows, Style::detect())
    );
    Ok(())
}
