//! HTTP drug image source speaking the NLM RxImage response format.
//!
//! `GET {base_url}?name={term}` returns `{"nlmRxImages": [{"imageUrl": ...}, ...]}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use scriptscan_core::{DrugImageSource, LookupError};

pub const DEFAULT_RXIMAGE_URL: &str = "https://rximage.nlm.nih.gov/api/rximage/1/rxnav";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RxImageSource {
    client: Client,
    base_url: String,
}

impl RxImageSource {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: DEFAULT_RXIMAGE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn query_url(&self, term: &str) -> String {
        format!("{}?name={}", self.base_url, urlencoding::encode(term))
    }
}

impl Default for RxImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RxImageResponse {
    #[serde(default)]
    nlm_rx_images: Vec<RxImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RxImage {
    image_url: Option<String>,
}

fn image_urls(body: &str) -> Result<Vec<String>, LookupError> {
    let response: RxImageResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Parse(e.to_string()))?;
    Ok(response
        .nlm_rx_images
        .into_iter()
        .filter_map(|image| image.image_url)
        .filter(|url| !url.trim().is_empty())
        .collect())
}

#[async_trait]
impl DrugImageSource for RxImageSource {
    fn name(&self) -> &str {
        "rximage"
    }

    async fn search(&self, term: &str) -> Result<Vec<String>, LookupError> {
        debug!(term = %term, "Querying RxImage");
        let response = self
            .client
            .get(self.query_url(term))
            .header("User-Agent", "ScriptScan/1.0")
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        image_urls(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_term_into_query() {
        let source = RxImageSource::new().with_base_url("https://img.test/rxnav");
        assert_eq!(source.query_url("Folic Acid"), "https://img.test/rxnav?name=Folic%20Acid");
    }

    #[test]
    fn reads_image_urls_in_order() {
        let body = r#"{"replyStatus": {"success": true}, "nlmRxImages": [
            {"imageUrl": "https://img/1.jpg", "name": "A"},
            {"name": "no url"},
            {"imageUrl": "https://img/2.jpg"}
        ]}"#;
        assert_eq!(image_urls(body).unwrap(), vec!["https://img/1.jpg", "https://img/2.jpg"]);
    }

    #[test]
    fn missing_list_means_no_results() {
        assert!(image_urls(r#"{"replyStatus": {"success": true}}"#).unwrap().is_empty());
    }

    #[test]
    fn garbage_body_is_parse_error() {
        assert!(matches!(image_urls("<html>"), Err(LookupError::Parse(_))));
    }
}
