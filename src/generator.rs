use base64::Engine;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    error::{GenerationError, Result},
    prompt::{self, SchemaStyle, SYSTEM_INSTRUCTION},
    provider::{ImageRequest, RecipeProvider, TextRequest},
    types::{GeneratedImage, GenerationRequest, GenerationStage, Recipe, RecipeDraft},
};

/// Model and sampling settings for a generator.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub text_model: String,
    pub image_model: String,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f64,
    /// Pixel size for providers that take one.
    pub image_size: String,
    /// Aspect ratio for providers that take one.
    pub aspect_ratio: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            text_model: crate::provider::gemini::DEFAULT_TEXT_MODEL.to_string(),
            image_model: crate::provider::gemini::DEFAULT_IMAGE_MODEL.to_string(),
            temperature: 0.7,
            image_size: "1024x1024".to_string(),
            aspect_ratio: "1:1".to_string(),
        }
    }
}

impl GenerationOptions {
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_image_size(mut self, size: impl Into<String>) -> Self {
        self.image_size = size.into();
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = ratio.into();
        self
    }
}

/// Two-phase recipe generation over a [`RecipeProvider`].
///
/// Phase one asks the text model for a structured recipe and validates it.
/// Phase two asks the image model for one picture of the named dish. Any
/// failure ends the request with a classified [`GenerationError`]; nothing is
/// retried. The generator holds only read-only configuration, so concurrent
/// calls share no state.
#[derive(Clone)]
pub struct RecipeGenerator {
    provider: Arc<dyn RecipeProvider>,
    options: GenerationOptions,
}

impl std::fmt::Debug for RecipeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeGenerator")
            .field("provider", &self.provider.name())
            .field("options", &self.options)
            .finish()
    }
}

impl RecipeGenerator {
    pub fn new(provider: Arc<dyn RecipeProvider>) -> Self {
        Self {
            provider,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Generate a recipe for `request`.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Recipe> {
        self.generate_with_progress(request, |_| {}).await
    }

    /// Generate a recipe, reporting each state transition to `on_stage`.
    ///
    /// The callback sees `Building`, then `AwaitingText`, then either
    /// `TextFailed` or `AwaitingImage`, then `ImageFailed` or `Complete`.
    pub async fn generate_with_progress<F>(
        &self,
        request: &GenerationRequest,
        mut on_stage: F,
    ) -> Result<Recipe>
    where
        F: FnMut(GenerationStage),
    {
        on_stage(GenerationStage::Building);

        let draft = match self.text_phase(request, &mut on_stage).await {
            Ok(draft) => draft,
            Err(e) => {
                warn!(kind = e.kind().code(), "Recipe text generation failed: {}", e);
                on_stage(GenerationStage::TextFailed);
                return Err(e);
            }
        };

        on_stage(GenerationStage::AwaitingImage);
        match self.image_phase(draft).await {
            Ok(recipe) => {
                info!(recipe = %recipe.recipe_name, "Recipe generation complete");
                on_stage(GenerationStage::Complete);
                Ok(recipe)
            }
            Err(e) => {
                warn!(kind = e.kind().code(), "Recipe image generation failed: {}", e);
                on_stage(GenerationStage::ImageFailed);
                Err(e)
            }
        }
    }

    async fn text_phase<F>(&self, request: &GenerationRequest, on_stage: &mut F) -> Result<RecipeDraft>
    where
        F: FnMut(GenerationStage),
    {
        if !request.has_ingredients() {
            return Err(GenerationError::NoInput);
        }
        if !self.provider.has_credential() {
            return Err(GenerationError::MissingCredential);
        }

        let style = self.provider.schema_style();
        let text_request = TextRequest {
            model: self.options.text_model.clone(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            prompt: prompt::build_recipe_prompt(request, style),
            response_schema: match style {
                SchemaStyle::OutOfBand => Some(prompt::recipe_response_schema()),
                SchemaStyle::Inline => None,
            },
            temperature: self.options.temperature,
        };

        on_stage(GenerationStage::AwaitingText);
        info!(
            provider = self.provider.name(),
            model = %text_request.model,
            language = request.language.code(),
            "Requesting recipe text"
        );

        let text = self
            .provider
            .generate_structured_text(&text_request)
            .await?
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::EmptyResponse(Some("The model returned no text".into()))
            })?;
        debug!(bytes = text.len(), "Received recipe text");

        parse_recipe(&text)
    }

    async fn image_phase(&self, draft: RecipeDraft) -> Result<Recipe> {
        let image_request = ImageRequest {
            model: self.options.image_model.clone(),
            prompt: prompt::image_prompt(&draft.recipe_name),
            count: 1,
            size: self.options.image_size.clone(),
            aspect_ratio: self.options.aspect_ratio.clone(),
        };
        info!(
            provider = self.provider.name(),
            model = %image_request.model,
            "Requesting recipe image"
        );

        let image = match self.provider.generate_image(&image_request).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                return Err(GenerationError::ImageGenerationFailed {
                    draft: Box::new(draft),
                    detail: Some("The provider returned no image bytes".into()),
                })
            }
            // Quota and credential failures keep their own classification.
            Err(e) => return Err(e.into()),
        };

        if let Err(detail) = check_image(&image) {
            return Err(GenerationError::ImageGenerationFailed {
                draft: Box::new(draft),
                detail: Some(detail),
            });
        }

        Ok(draft.into_recipe(image.data_uri()))
    }
}

fn check_image(image: &GeneratedImage) -> std::result::Result<(), String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(image.base64.trim())
        .map_err(|e| format!("Image bytes are not valid base64: {}", e))?;
    if bytes.is_empty() {
        return Err("Image payload was empty".into());
    }
    if !image.mime_type.starts_with("image/") {
        return Err(format!("Unexpected image MIME type: {}", image.mime_type));
    }
    Ok(())
}

/// Parse and validate the text model's answer.
///
/// Accepts a bare JSON object, or failing that one wrapped in a ```json
/// fence. Anything that does not decode into a complete, non-blank
/// [`RecipeDraft`] is a `MalformedResponse`.
pub fn parse_recipe(text: &str) -> Result<RecipeDraft> {
    let trimmed = text.trim();
    // A bare object wins; fences inside its string values must not be cut.
    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(direct) => {
            let block = extract_json_block(trimmed).ok_or_else(|| {
                GenerationError::malformed(format!("Response is not valid JSON: {}", direct))
            })?;
            serde_json::from_str(block).map_err(|e| {
                GenerationError::malformed(format!("Response is not valid JSON: {}", e))
            })?
        }
    };
    let draft: RecipeDraft = serde_json::from_value(value)
        .map_err(|e| GenerationError::malformed(format!("Response does not match the recipe schema: {}", e)))?;
    draft
        .validate()
        .map_err(|field| GenerationError::malformed(format!("Required field '{}' is empty", field)))?;
    Ok(draft)
}

/// Extract the body of a ```json ... ``` (or bare ```) code block.
fn extract_json_block(text: &str) -> Option<&str> {
    let markers = ["```json", "```JSON", "```"];
    for marker in markers {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end) = text[content_start..].find("```") {
                return Some(text[content_start..content_start + end].trim());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const VALID: &str = r#"{
        "recipeName": "Garlic Butter Shrimp",
        "description": "Fast weeknight seafood",
        "prepTime": "10 minutes",
        "cookTime": "8 minutes",
        "servings": "2 servings",
        "ingredients": ["300g shrimp", "3 cloves garlic", "30g butter"],
        "steps": ["Melt butter", "Add garlic", "Cook shrimp"],
        "tags": ["Seafood", "Quick"]
    }"#;

    #[test]
    fn test_parse_recipe_direct() {
        let draft = parse_recipe(VALID).unwrap();
        assert_eq!(draft.recipe_name, "Garlic Butter Shrimp");
        assert_eq!(draft.steps.len(), 3);
    }

    #[test]
    fn test_parse_recipe_bare_with_backticks_in_values() {
        let text = VALID.replace("Add garlic", "Add garlic ``` then ``` stir");
        let draft = parse_recipe(&text).unwrap();
        assert_eq!(draft.steps[1], "Add garlic ``` then ``` stir");
    }

    #[test]
    fn test_parse_recipe_fenced() {
        let text = format!("Here you go:\n```json\n{}\n```\n", VALID);
        assert!(parse_recipe(&text).is_ok());
    }

    #[test]
    fn test_parse_recipe_not_json() {
        let err = parse_recipe("Sorry, I can only talk about cooking.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.detail().unwrap().contains("not valid JSON"));
    }

    #[test]
    fn test_parse_recipe_missing_field() {
        let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
        value.as_object_mut().unwrap().remove("cookTime");
        let err = parse_recipe(&value.to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.detail().unwrap().contains("cookTime"));
    }

    #[test]
    fn test_parse_recipe_blank_field() {
        let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
        value["description"] = serde_json::json!("");
        let err = parse_recipe(&value.to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_extract_json_block() {
        let text = "text\n```json\n{\"a\":1}\n```\nmore";
        assert_eq!(extract_json_block(text), Some("{\"a\":1}"));
        assert_eq!(extract_json_block("no code block"), None);
    }

    #[test]
    fn test_check_image() {
        assert!(check_image(&GeneratedImage::new("image/png", "iVBORw0KGgo=")).is_ok());
        assert!(check_image(&GeneratedImage::new("image/png", "not base64!!")).is_err());
        assert!(check_image(&GeneratedImage::new("image/png", "")).is_err());
        assert!(check_image(&GeneratedImage::new("text/html", "iVBORw0KGgo=")).is_err());
    }

    #[test]
    fn test_generation_options_builder() {
        let options = GenerationOptions::default()
            .with_text_model("t")
            .with_image_model("i")
            .with_temperature(0.2)
            .with_image_size("512x512")
            .with_aspect_ratio("4:3");
        assert_eq!(options.text_model, "t");
        assert_eq!(options.image_model, "i");
        assert_eq!(options.temperature, 0.2);
        assert_eq!(options.image_size, "512x512");
        assert_eq!(options.aspect_ratio, "4:3");
    }
}
