//! Generate one recipe from the command line.
//!
//! ```text
//! GEMINI_API_KEY=... cargo run --example generate_recipe -- "chicken, potatoes" --zh
//! ```
//!
//! With no ingredients given, a random sample trio is used.

use recipe_forge::{i18n, samples, GenerationRequest, GenerationStage, Language, ProviderConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recipe_forge=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let language = if args.iter().any(|a| a == "--zh") {
        Language::Zh
    } else {
        Language::En
    };
    let ingredients = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    let request = if ingredients.trim().is_empty() {
        samples::random_request(language)
    } else {
        GenerationRequest::new(ingredients).with_language(language)
    };

    let config = ProviderConfig::from_env();
    if config.require_key().is_err() {
        anyhow::bail!(
            "{}",
            i18n::t_with(language, "error.keyMissing", &[("var", config.provider.key_var())])
        );
    }

    println!("Ingredients: {}", request.ingredients);
    let generator = config.build_generator();
    let result = generator
        .generate_with_progress(&request, |stage| {
            if matches!(stage, GenerationStage::AwaitingText | GenerationStage::AwaitingImage) {
                println!("... {:?}", stage);
            }
        })
        .await;

    match result {
        Ok(recipe) => {
            println!("\n{}\n{}\n", recipe.recipe_name, recipe.description);
            println!(
                "{}: {} | {}: {} | {}: {}",
                i18n::t(language, "modal.prepTime"),
                recipe.prep_time,
                i18n::t(language, "modal.cookTime"),
                recipe.cook_time,
                i18n::t(language, "modal.servings"),
                recipe.servings
            );
            println!("\n{}:", i18n::t(language, "modal.ingredients"));
            for item in &recipe.ingredients {
                println!("  - {}", item);
            }
            println!("\n{}:", i18n::t(language, "modal.instructions"));
            for (i, step) in recipe.steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
            println!("\nTags: {}", recipe.tags.join(", "));
            println!("Image: {} bytes of data URI", recipe.image_url.len());
        }
        Err(e) => {
            eprintln!("{}", i18n::t(language, "modal.error.title"));
            if let Some(draft) = e.partial_recipe() {
                eprintln!("(text-only recipe available: {})", draft.recipe_name);
            }
            anyhow::bail!("{} [{}]", i18n::user_message(&e, language), e.kind().code());
        }
    }

    Ok(())
}
