use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{error_from_response, normalize, read_json, ImageRequest, RecipeProvider, TextRequest};
use crate::config::Credential;
use crate::error::ProviderError;
use crate::prompt::SchemaStyle;
use crate::types::GeneratedImage;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Adapter for OpenAI and OpenAI-compatible gateways.
///
/// Text goes through `/chat/completions` in JSON-object mode with the schema
/// embedded in the prompt; images through `/images/generations` with
/// `b64_json` output.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    http: Client,
    endpoint: String,
    api_key: Option<Credential>,
    timeout: Duration,
}

impl OpenAiProvider {
    /// Create an adapter for the public OpenAI endpoint. Blank or placeholder
    /// keys are treated as not configured.
    pub fn new(api_key: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: DEFAULT_BASE_URL.to_string(),
            api_key: Credential::parse(api_key),
            timeout: Duration::from_secs(120),
        }
    }

    /// Point the adapter at a compatible gateway.
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

    fn key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_ref()
            .map(|k| k.expose())
            .ok_or_else(|| ProviderError::InvalidResponse("OpenAI API key is not configured".into()))
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/{}", self.endpoint, path);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.key()?)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                context: format!("Failed to connect to OpenAI at {}", url),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(resp)
    }
}

#[async_trait]
impl RecipeProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn schema_style(&self) -> SchemaStyle {
        SchemaStyle::Inline
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_structured_text(
        &self,
        request: &TextRequest,
    ) -> Result<Option<String>, ProviderError> {
        let body = json!({
            "model": request.model,
            "messages": [
                {"role": "system", "content": request.system_instruction},
                {"role": "user", "content": request.prompt},
            ],
            "response_format": {"type": "json_object"},
            "temperature": request.temperature,
        });

        let resp = self.post("chat/completions", &body).await?;
        let parsed: ChatResponse = read_json(resp, "Failed to read OpenAI chat response").await?;
        text_from_chat(parsed)
    }

    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<Option<GeneratedImage>, ProviderError> {
        let body = json!({
            "model": request.model,
            "prompt": request.prompt,
            "n": request.count,
            "size": request.size,
            "response_format": "b64_json",
        });

        let resp = self.post("images/generations", &body).await?;
        let parsed: ImageResponse = read_json(resp, "Failed to read OpenAI image response").await?;

        Ok(parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .filter(|b| !b.is_empty())
            .map(|b| GeneratedImage::new("image/png", b)))
    }
}

fn text_from_chat(parsed: ChatResponse) -> Result<Option<String>, ProviderError> {
    let Some(choice) = parsed.choices.into_iter().next() else {
        return Ok(None);
    };

    if let Some(refusal) = choice.message.refusal.filter(|r| !r.is_empty()) {
        return Err(ProviderError::Blocked(refusal));
    }
    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(ProviderError::Blocked("content_filter".into()));
    }
    Ok(choice.message.content)
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(json: &str) -> ChatResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_placeholder_key_is_not_configured() {
        assert!(!OpenAiProvider::new("your_api_key_here").has_credential());
        assert!(!OpenAiProvider::new("").has_credential());
        assert!(OpenAiProvider::new("sk-live-123").has_credential());
    }

    #[test]
    fn test_endpoint_override_is_normalized() {
        let provider = OpenAiProvider::new("sk-1").with_endpoint("https://gateway.example/v1/");
        assert_eq!(provider.endpoint(), "https://gateway.example/v1");
    }

    #[test]
    fn test_text_from_chat_content() {
        let parsed = chat(r#"{"choices": [{"message": {"content": "{}"}, "finish_reason": "stop"}]}"#);
        assert_eq!(text_from_chat(parsed).unwrap(), Some("{}".to_string()));
    }

    #[test]
    fn test_text_from_chat_no_choices() {
        let parsed = chat(r#"{"choices": []}"#);
        assert_eq!(text_from_chat(parsed).unwrap(), None);
    }

    #[test]
    fn test_text_from_chat_refusal_is_blocked() {
        let parsed = chat(
            r#"{"choices": [{"message": {"content": null, "refusal": "I can't help"}, "finish_reason": "stop"}]}"#,
        );
        assert!(matches!(text_from_chat(parsed), Err(ProviderError::Blocked(_))));
    }

    #[test]
    fn test_text_from_chat_content_filter_is_blocked() {
        let parsed =
            chat(r#"{"choices": [{"message": {"content": ""}, "finish_reason": "content_filter"}]}"#);
        assert!(matches!(text_from_chat(parsed), Err(ProviderError::Blocked(_))));
    }
}
