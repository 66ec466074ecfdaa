//! # Recipe Forge
//!
//! Turn a list of ingredients and a few preference filters into a complete
//! recipe (name, description, timings, ingredients, steps, tags and an
//! illustrative image) using hosted text and image models.
//!
//! ## Features
//!
//! - **Two-phase generation**: structured recipe text first, then a food
//!   photograph of the named dish, composed into one [`Recipe`]
//! - **Strict validation**: the text answer must decode into every required
//!   field with the right type and no blank values, or the request fails
//! - **Classified errors**: every failure maps to one [`GenerationError`]
//!   variant (quota, bad key, malformed answer, ...) that callers can key
//!   localized messages on
//! - **Provider adapters**: OpenAI-compatible and Gemini backends behind the
//!   [`RecipeProvider`] trait; tests plug in their own
//! - **Localized messages** for error tags and filter labels (English, Chinese)
//!
//! ## Quick Start
//!
//! ```no_run
//! use recipe_forge::{Difficulty, GenerationRequest, Language, ProviderConfig, SearchFilters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = ProviderConfig::from_env().build_generator();
//!
//!     let request = GenerationRequest::new("chicken, potatoes, onion")
//!         .with_filters(SearchFilters::new().difficulty(Difficulty::Easy))
//!         .with_language(Language::En);
//!
//!     match generator.generate(&request).await {
//!         Ok(recipe) => println!("{}: {}", recipe.recipe_name, recipe.description),
//!         Err(e) => eprintln!("{}", recipe_forge::i18n::user_message(&e, Language::En)),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod i18n;
pub mod prompt;
pub mod provider;
pub mod samples;
pub mod types;

pub use config::{Credential, ProviderConfig, ProviderKind};
pub use error::{ErrorKind, GenerationError, ProviderError, Result};
pub use generator::{parse_recipe, GenerationOptions, RecipeGenerator};
pub use provider::{GeminiProvider, ImageRequest, OpenAiProvider, RecipeProvider, TextRequest};
pub use types::{
    Diet, Difficulty, GeneratedImage, GenerationRequest, GenerationStage, Language, Preference,
    Recipe, RecipeDraft, SearchFilters,
};
