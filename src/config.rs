use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::error::GenerationError;
use crate::generator::{GenerationOptions, RecipeGenerator};
use crate::provider::{gemini, openai, GeminiProvider, OpenAiProvider, RecipeProvider};

/// Values that show up in `.env` templates and must never be sent as a key.
const PLACEHOLDER_KEYS: &[&str] = &["your_api_key_here", "your-api-key", "placeholder", "xxx"];

/// A non-empty API key that is not a template placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Accept `raw` as a credential, or `None` if it is blank or a placeholder.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lower = trimmed.to_lowercase();
        if PLACEHOLDER_KEYS.iter().any(|p| lower.contains(p)) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Hosted service the generator talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    OpenAi,
    #[default]
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Environment variable holding this provider's key.
    pub fn key_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }

    fn base_url_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_BASE_URL",
            ProviderKind::Gemini => "GEMINI_BASE_URL",
        }
    }

    fn default_models(&self) -> (&'static str, &'static str) {
        match self {
            ProviderKind::OpenAi => (openai::DEFAULT_TEXT_MODEL, openai::DEFAULT_IMAGE_MODEL),
            ProviderKind::Gemini => (gemini::DEFAULT_TEXT_MODEL, gemini::DEFAULT_IMAGE_MODEL),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// Everything needed to construct a [`RecipeGenerator`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    /// Raw key as configured; validated when the adapter is built.
    pub api_key: String,
    /// Base endpoint override.
    pub base_url: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub temperature: f64,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: String::new(),
            base_url: None,
            text_model: None,
            image_model: None,
            temperature: 0.7,
            timeout: Duration::from_secs(120),
        }
    }
}

impl ProviderConfig {
    pub fn new(provider: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Load from the process environment after reading `.env` if present.
    ///
    /// Never fails: unparseable values fall back to defaults with a warning,
    /// and a missing key surfaces later as `MissingCredential`.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!("Loaded .env from: {}", path.display()),
            Err(_) => tracing::debug!("No .env file found - continuing with env vars only"),
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get("RECIPE_PROVIDER") {
            match raw.parse() {
                Ok(kind) => config.provider = kind,
                Err(e) => tracing::warn!("{} - using {}", e, config.provider.as_str()),
            }
        }

        config.api_key = get(config.provider.key_var()).unwrap_or_default();
        config.base_url = get(config.provider.base_url_var());
        config.text_model = get("RECIPE_TEXT_MODEL");
        config.image_model = get("RECIPE_IMAGE_MODEL");

        if let Some(raw) = get("RECIPE_TEMPERATURE") {
            match raw.trim().parse::<f64>() {
                Ok(t) if (0.0..=2.0).contains(&t) => config.temperature = t,
                _ => tracing::warn!("Invalid RECIPE_TEMPERATURE {:?} - using {}", raw, config.temperature),
            }
        }

        if let Some(raw) = get("RECIPE_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    "Invalid RECIPE_TIMEOUT_SECS {:?} - using {}s",
                    raw,
                    config.timeout.as_secs()
                ),
            }
        }

        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = Some(model.into());
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the configured key would be accepted.
    pub fn has_usable_key(&self) -> bool {
        Credential::parse(&self.api_key).is_some()
    }

    /// Fail with `MissingCredential` unless the configured key would be accepted.
    pub fn require_key(&self) -> crate::error::Result<()> {
        if self.has_usable_key() {
            Ok(())
        } else {
            Err(GenerationError::MissingCredential)
        }
    }

    /// Generation options with provider defaults filled in.
    pub fn generation_options(&self) -> GenerationOptions {
        let (text, image) = self.provider.default_models();
        GenerationOptions::default()
            .with_text_model(self.text_model.as_deref().unwrap_or(text))
            .with_image_model(self.image_model.as_deref().unwrap_or(image))
            .with_temperature(self.temperature)
    }

    /// Construct the adapter for the configured provider.
    pub fn build_provider(&self) -> Arc<dyn RecipeProvider> {
        let http = Client::new();
        match self.provider {
            ProviderKind::OpenAi => {
                let mut p = OpenAiProvider::new(&self.api_key)
                    .with_http_client(http)
                    .with_timeout(self.timeout);
                if let Some(url) = &self.base_url {
                    p = p.with_endpoint(url.clone());
                }
                Arc::new(p)
            }
            ProviderKind::Gemini => {
                let mut p = GeminiProvider::new(&self.api_key)
                    .with_http_client(http)
                    .with_timeout(self.timeout);
                if let Some(url) = &self.base_url {
                    p = p.with_endpoint(url.clone());
                }
                Arc::new(p)
            }
        }
    }

    pub fn build_generator(&self) -> RecipeGenerator {
        RecipeGenerator::new(self.build_provider()).with_options(self.generation_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_credential_rejects_blank_and_placeholders() {
        assert!(Credential::parse("").is_none());
        assert!(Credential::parse("   ").is_none());
        assert!(Credential::parse("your_api_key_here").is_none());
        assert!(Credential::parse("YOUR-API-KEY").is_none());
        assert!(Credential::parse("sk-placeholder-1").is_none());
        assert!(Credential::parse("xxx").is_none());
    }

    #[test]
    fn test_credential_trims_real_key() {
        let cred = Credential::parse("  sk-abc123 \n").unwrap();
        assert_eq!(cred.expose(), "sk-abc123");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::parse("sk-secret").unwrap();
        assert!(!format!("{:?}", cred).contains("secret"));
    }

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::from_lookup(lookup(&[]));
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(!config.has_usable_key());
        assert!(matches!(config.require_key(), Err(GenerationError::MissingCredential)));
    }

    #[test]
    fn test_require_key() {
        assert!(ProviderConfig::new(ProviderKind::OpenAi, "sk-real").require_key().is_ok());
        let err = ProviderConfig::new(ProviderKind::Gemini, "your_api_key_here")
            .require_key()
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MissingCredential);
    }

    #[test]
    fn test_openai_from_env() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("RECIPE_PROVIDER", "openai"),
            ("OPENAI_API_KEY", "sk-1"),
            ("OPENAI_BASE_URL", "https://gateway.example/v1"),
            ("GEMINI_API_KEY", "ignored"),
            ("RECIPE_TEMPERATURE", "0.4"),
            ("RECIPE_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.api_key, "sk-1");
        assert_eq!(config.base_url.as_deref(), Some("https://gateway.example/v1"));
        assert_eq!(config.temperature, 0.4);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("RECIPE_PROVIDER", "mystery"),
            ("RECIPE_TEMPERATURE", "hot"),
            ("RECIPE_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_generation_options_use_provider_defaults() {
        let options = ProviderConfig::new(ProviderKind::OpenAi, "sk-1").generation_options();
        assert_eq!(options.text_model, "gpt-4o-mini");
        assert_eq!(options.image_model, "dall-e-3");

        let options = ProviderConfig::new(ProviderKind::Gemini, "k")
            .with_text_model("gemini-custom")
            .generation_options();
        assert_eq!(options.text_model, "gemini-custom");
        assert_eq!(options.image_model, gemini::DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn test_build_provider_reports_credential() {
        let provider = ProviderConfig::new(ProviderKind::Gemini, "your_api_key_here").build_provider();
        assert_eq!(provider.name(), "gemini");
        assert!(!provider.has_credential());

        let provider = ProviderConfig::new(ProviderKind::OpenAi, "sk-real").build_provider();
        assert_eq!(provider.name(), "openai");
        assert!(provider.has_credential());
    }
}
