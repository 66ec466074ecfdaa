use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{error_from_response, normalize, read_json, ImageRequest, RecipeProvider, TextRequest};
use crate::config::Credential;
use crate::error::ProviderError;
use crate::prompt::SchemaStyle;
use crate::types::GeneratedImage;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

const IMAGE_MIME: &str = "image/jpeg";

/// Finish reasons that mean the candidate was withheld.
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "RECITATION"];

/// Adapter for the Gemini API: `generateContent` with an out-of-band response
/// schema, and Imagen `predict` for images.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    http: Client,
    endpoint: String,
    api_key: Option<Credential>,
    timeout: Duration,
}

impl GeminiProvider {
    /// Create an adapter for the public Gemini endpoint. Blank or placeholder
    /// keys are treated as not configured.
    pub fn new(api_key: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: DEFAULT_BASE_URL.to_string(),
            api_key: Credential::parse(api_key),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = normalize(endpoint.into());
        self
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:{}", self.endpoint, model_path, method)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response, ProviderError> {
        let key = self
            .api_key
            .as_ref()
            .map(|k| k.expose())
            .ok_or_else(|| ProviderError::InvalidResponse("Gemini API key is not configured".into()))?;

        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                context: format!("Failed to connect to Gemini at {}", self.endpoint),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(resp)
    }
}

#[async_trait]
impl RecipeProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn schema_style(&self) -> SchemaStyle {
        SchemaStyle::OutOfBand
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_structured_text(
        &self,
        request: &TextRequest,
    ) -> Result<Option<String>, ProviderError> {
        let mut body = json!({
            "systemInstruction": {"parts": [{"text": request.system_instruction}]},
            "contents": [{"role": "user", "parts": [{"text": request.prompt}]}],
            "generationConfig": {
                "temperature": request.temperature,
                "responseMimeType": "application/json",
            },
        });
        if let Some(schema) = &request.response_schema {
            body["generationConfig"]["responseSchema"] = schema.clone();
        }

        let url = self.model_url(&request.model, "generateContent");
        let resp = self.post(&url, &body).await?;
        let parsed: GenerateContentResponse =
            read_json(resp, "Failed to read Gemini generateContent response").await?;
        text_from_candidates(parsed)
    }

    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<Option<GeneratedImage>, ProviderError> {
        let body = json!({
            "instances": [{"prompt": request.prompt}],
            "parameters": {
                "sampleCount": request.count,
                "aspectRatio": request.aspect_ratio,
                "outputMimeType": IMAGE_MIME,
            },
        });

        let url = self.model_url(&request.model, "predict");
        let resp = self.post(&url, &body).await?;
        let parsed: PredictResponse = read_json(resp, "Failed to read Imagen predict response").await?;

        Ok(parsed.predictions.into_iter().find_map(|p| {
            let bytes = p.bytes_base64_encoded.filter(|b| !b.is_empty())?;
            let mime = p.mime_type.unwrap_or_else(|| IMAGE_MIME.to_string());
            Some(GeneratedImage::new(mime, bytes))
        }))
    }
}

fn text_from_candidates(parsed: GenerateContentResponse) -> Result<Option<String>, ProviderError> {
    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::Blocked(reason));
    }

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Ok(None);
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if BLOCKING_FINISH_REASONS.contains(&reason) {
            return Err(ProviderError::Blocked(reason.to_string()));
        }
    }

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    Ok(if text.is_empty() { None } else { Some(text) })
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
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}
