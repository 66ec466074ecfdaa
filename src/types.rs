use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output language for the generated recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    /// Language name as it should appear inside a prompt.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Zh => "Chinese",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "zh" | "chinese" => Ok(Language::Zh),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

/// Generates a filter vocabulary enum with a stable wire string.
macro_rules! filter_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(format!(
                        "Unknown {} value: {}",
                        stringify!($name).to_lowercase(),
                        other
                    )),
                }
            }
        }
    };
}

filter_enum! {
    /// Flavor profile.
    Preference {
        Chinese => "chinese",
        Western => "western",
        Spicy => "spicy",
        Light => "light",
    }
}

filter_enum! {
    Difficulty {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
    }
}

filter_enum! {
    /// Dietary goal.
    Diet {
        Balanced => "balanced",
        LowFat => "low-fat",
        HighProtein => "high-protein",
        Vegetarian => "vegetarian",
    }
}

/// Optional preference filters attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub preference: Option<Preference>,
    pub difficulty: Option<Difficulty>,
    pub diet: Option<Diet>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preference(mut self, value: Preference) -> Self {
        self.preference = Some(value);
        self
    }

    pub fn difficulty(mut self, value: Difficulty) -> Self {
        self.difficulty = Some(value);
        self
    }

    pub fn diet(mut self, value: Diet) -> Self {
        self.diet = Some(value);
        self
    }

    /// Select `value`, or clear the filter if it is already selected.
    pub fn toggle_preference(&mut self, value: Preference) {
        self.preference = toggled(self.preference, value);
    }

    pub fn toggle_difficulty(&mut self, value: Difficulty) {
        self.difficulty = toggled(self.difficulty, value);
    }

    pub fn toggle_diet(&mut self, value: Diet) {
        self.diet = toggled(self.diet, value);
    }
}

fn toggled<T: PartialEq>(current: Option<T>, value: T) -> Option<T> {
    match current {
        Some(c) if c == value => None,
        _ => Some(value),
    }
}

/// One user-initiated generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Free-form ingredient text, passed to the model verbatim.
    pub ingredients: String,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default)]
    pub language: Language,
}

impl GenerationRequest {
    pub fn new(ingredients: impl Into<String>) -> Self {
        Self {
            ingredients: ingredients.into(),
            filters: SearchFilters::default(),
            language: Language::default(),
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// True when there is something other than whitespace to cook with.
    pub fn has_ingredients(&self) -> bool {
        !self.ingredients.trim().is_empty()
    }
}

/// Recipe content returned by the text phase, before an image is attached.
///
/// Decoding is strict: every field is required and must have the declared
/// type. Use [`RecipeDraft::validate`] to also reject blank values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub recipe_name: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub tags: Vec<String>,
}

impl RecipeDraft {
    /// Check the non-emptiness invariants serde cannot express.
    ///
    /// Returns the wire name of the first offending field.
    pub fn validate(&self) -> Result<(), &'static str> {
        let text_fields = [
            ("recipeName", &self.recipe_name),
            ("description", &self.description),
            ("prepTime", &self.prep_time),
            ("cookTime", &self.cook_time),
            ("servings", &self.servings),
        ];
        for (name, value) in text_fields {
            if value.trim().is_empty() {
                return Err(name);
            }
        }

        let list_fields = [("ingredients", &self.ingredients), ("steps", &self.steps)];
        for (name, items) in list_fields {
            if items.is_empty() || items.iter().any(|i| i.trim().is_empty()) {
                return Err(name);
            }
        }

        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err("tags");
        }
        Ok(())
    }

    /// Attach an image and produce the final artifact.
    pub fn into_recipe(self, image_url: String) -> Recipe {
        Recipe {
            recipe_name: self.recipe_name,
            description: self.description,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            servings: self.servings,
            ingredients: self.ingredients,
            steps: self.steps,
            tags: self.tags,
            image_url,
        }
    }
}

/// The complete generated recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub recipe_name: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub tags: Vec<String>,
    /// `data:<mime>;base64,<bytes>` URI, or a remote URL.
    pub image_url: String,
}

/// Inline image returned by an image provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub base64: String,
}

impl GeneratedImage {
    pub fn new(mime_type: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: base64.into(),
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Position of a request in the generation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Idle,
    Building,
    AwaitingText,
    TextFailed,
    AwaitingImage,
    ImageFailed,
    Complete,
}

impl GenerationStage {
    /// Whether the request has settled.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationStage::TextFailed | GenerationStage::ImageFailed | GenerationStage::Complete
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RecipeDraft {
        RecipeDraft {
            recipe_name: "Tomato Egg Stir-fry".into(),
            description: "Quick and homely".into(),
            prep_time: "5 minutes".into(),
            cook_time: "10 minutes".into(),
            servings: "2 servings".into(),
            ingredients: vec!["3 eggs".into(), "2 tomatoes".into()],
            steps: vec!["Beat eggs".into(), "Stir-fry".into()],
            tags: vec!["Quick".into()],
        }
    }

    #[test]
    fn test_filter_wire_strings() {
        assert_eq!(Diet::LowFat.as_str(), "low-fat");
        assert_eq!("high-protein".parse::<Diet>(), Ok(Diet::HighProtein));
        assert_eq!(
            serde_json::to_string(&Preference::Spicy).unwrap(),
            "\"spicy\""
        );
        assert!("fiery".parse::<Preference>().is_err());
        assert_eq!(Difficulty::ALL.len(), 3);
    }

    #[test]
    fn test_toggle_clears_selected_value() {
        let mut filters = SearchFilters::new();
        filters.toggle_difficulty(Difficulty::Easy);
        assert_eq!(filters.difficulty, Some(Difficulty::Easy));
        filters.toggle_difficulty(Difficulty::Hard);
        assert_eq!(filters.difficulty, Some(Difficulty::Hard));
        filters.toggle_difficulty(Difficulty::Hard);
        assert_eq!(filters.difficulty, None);
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("ZH".parse::<Language>(), Ok(Language::Zh));
        assert_eq!("english".parse::<Language>(), Ok(Language::En));
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Language::Zh.prompt_name(), "Chinese");
    }

    #[test]
    fn test_has_ingredients() {
        assert!(GenerationRequest::new("eggs").has_ingredients());
        assert!(!GenerationRequest::new("  \n\t").has_ingredients());
    }

    #[test]
    fn test_draft_decodes_camel_case() {
        let json = r#"{
            "recipeName": "Soup", "description": "Warm", "prepTime": "5 min",
            "cookTime": "20 min", "servings": "4", "ingredients": ["water"],
            "steps": ["boil"], "tags": []
        }"#;
        let d: RecipeDraft = serde_json::from_str(json).unwrap();
        assert_eq!(d.recipe_name, "Soup");
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_draft_rejects_missing_field() {
        let json = r#"{"recipeName": "Soup", "description": "Warm"}"#;
        assert!(serde_json::from_str::<RecipeDraft>(json).is_err());
    }

    #[test]
    fn test_draft_rejects_mistyped_field() {
        let json = r#"{
            "recipeName": "Soup", "description": "Warm", "prepTime": "5 min",
            "cookTime": "20 min", "servings": 4, "ingredients": ["water"],
            "steps": ["boil"], "tags": []
        }"#;
        assert!(serde_json::from_str::<RecipeDraft>(json).is_err());
    }

    #[test]
    fn test_validate_blank_fields() {
        let mut d = draft();
        d.cook_time = "   ".into();
        assert_eq!(d.validate(), Err("cookTime"));

        let mut d = draft();
        d.steps.clear();
        assert_eq!(d.validate(), Err("steps"));

        let mut d = draft();
        d.tags.push(String::new());
        assert_eq!(d.validate(), Err("tags"));
    }

    #[test]
    fn test_into_recipe_keeps_fields() {
        let d = draft();
        let recipe = d.clone().into_recipe("data:image/png;base64,AAAA".into());
        assert_eq!(recipe.recipe_name, d.recipe_name);
        assert_eq!(recipe.steps, d.steps);
        assert_eq!(recipe.image_url, "data:image/png;base64,AAAA");

        let json = serde_json::to_value(&recipe).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("recipeName").is_some());
    }

    #[test]
    fn test_data_uri() {
        let img = GeneratedImage::new("image/jpeg", "Zm9v");
        assert_eq!(img.data_uri(), "data:image/jpeg;base64,Zm9v");
    }

    #[test]
    fn test_terminal_stages() {
        assert!(GenerationStage::Complete.is_terminal());
        assert!(GenerationStage::TextFailed.is_terminal());
        assert!(!GenerationStage::AwaitingImage.is_terminal());
    }
}
