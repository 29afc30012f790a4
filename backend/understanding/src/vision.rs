//! Prescription extraction through the Gemini `generateContent` API.
//!
//! One request per analysis: the inline image, the routing prompt, and a
//! response schema that makes the service return JSON instead of prose.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use scriptscan_core::{ExtractionError, ImagePayload, PrescriptionExtractor, PrescriptionRecord};

use crate::language::LanguagePolicy;
use crate::parse::parse_record;
use crate::prompt::build_extraction_prompt;
use crate::schema::response_schema;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct GeminiExtractor {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    prompt: String,
    schema: Value,
}

impl GeminiExtractor {
    pub fn new(api_key: impl Into<String>, policy: &LanguagePolicy) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExtractionError::Service(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            prompt: build_extraction_prompt(policy),
            schema: response_schema(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the HTTP client, e.g. to apply a configured timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ExtractionError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractionError::Service(format!("failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// The `generateContent` body for one image.
    pub fn request_body(&self, image: &ImagePayload) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": image.mime_type, "data": STANDARD.encode(&image.data) } },
                    { "text": self.prompt }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": self.schema
            }
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Concatenated text of the first candidate, or why there is none.
fn response_text(response: &GenerateContentResponse) -> Result<String, ExtractionError> {
    let text: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| content.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(text);
    }
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(ExtractionError::Service(format!("request blocked: {reason}")));
    }
    if let Some(reason) = response.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
        debug!(finish_reason = %reason, "Gemini returned no text");
    }
    Err(ExtractionError::Empty)
}

fn describe_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("Gemini returned {status}: {}", envelope.error.message),
        Err(_) if body.trim().is_empty() => format!("Gemini returned {status}"),
        Err(_) => format!("Gemini returned {status}: {}", body.trim()),
    }
}

fn transport_error(e: reqwest::Error) -> ExtractionError {
    if e.is_timeout() {
        ExtractionError::Timeout
    } else {
        ExtractionError::Service(e.without_url().to_string())
    }
}

#[async_trait]
impl PrescriptionExtractor for GeminiExtractor {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn extract(&self, image: &ImagePayload) -> Result<PrescriptionRecord, ExtractionError> {
        let start = Instant::now();
        info!(
            model = %self.model,
            mime = %image.mime_type,
            bytes = image.data.len(),
            "Sending prescription image to Gemini"
        );

        let response = self
            .client
            .post(self.request_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(image))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = describe_error(status, &body);
            warn!(%status, "Gemini extraction request failed");
            return Err(ExtractionError::Service(message));
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ExtractionError::Timeout
            } else {
                ExtractionError::Parse(format!("unexpected response envelope: {}", e.without_url()))
            }
        })?;

        let record = parse_record(&response_text(&envelope)?)?;
        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            is_prescription = record.is_prescription,
            medications = record.medication_count(),
            "Gemini extraction complete"
        );
        Ok(record)
    }
}
