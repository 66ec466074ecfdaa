//! Remote model capabilities and their provider adapters.

pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ProviderError;
use crate::prompt::SchemaStyle;
use crate::types::GeneratedImage;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// A structured text-generation call.
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub model: String,
    pub system_instruction: String,
    pub prompt: String,
    /// Out-of-band schema, for providers whose [`SchemaStyle`] is `OutOfBand`.
    pub response_schema: Option<Value>,
    pub temperature: f64,
}

/// An image-generation call. Providers always return inline bytes.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub count: u32,
    /// Pixel size such as `1024x1024`, for providers that take one.
    pub size: String,
    /// Aspect ratio such as `1:1`, for providers that take one.
    pub aspect_ratio: String,
}

/// What the generator needs from a hosted model service.
#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// How this provider expects the output schema.
    fn schema_style(&self) -> SchemaStyle;

    /// Whether a usable credential is configured. Checked before any call.
    fn has_credential(&self) -> bool;

    /// Run a JSON-constrained text generation.
    ///
    /// `Ok(None)` means the provider answered but produced no text.
    async fn generate_structured_text(
        &self,
        request: &TextRequest,
    ) -> Result<Option<String>, ProviderError>;

    /// Generate one image as inline base64.
    ///
    /// `Ok(None)` means the provider answered without image bytes.
    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<Option<GeneratedImage>, ProviderError>;
}

pub(crate) fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Turn a non-success response into a [`ProviderError::Http`].
pub(crate) async fn error_from_response(resp: reqwest::Response) -> ProviderError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    ProviderError::from_http(status, &body)
}

/// Read a success body and decode it. Transport failures while reading are
/// `Network`; a body that does not match `T` is `Json`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    context: &str,
) -> Result<T, ProviderError> {
    let body = resp.text().await.map_err(|e| ProviderError::Network {
        context: context.to_string(),
        source: e,
    })?;
    Ok(serde_json::from_str(&body)?)
}
