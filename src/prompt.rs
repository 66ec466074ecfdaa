use serde_json::{json, Map, Value};

use crate::types::GenerationRequest;

/// System instruction sent with every recipe request.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a professional chef. Generate creative and delicious recipes in valid JSON format only.";

/// Sentinel written into the prompt for an unset filter.
pub const ANY: &str = "any";

const RECIPE_TEMPLATE: &str = "Ingredients I have: {ingredients}.
{preferences}

Please generate a delicious recipe based on the information above.
The entire recipe must be in {language}.
This includes the recipe name, description, ingredients, steps, and tags.";

const IMAGE_TEMPLATE: &str = "A beautiful, realistic, appetizing photo of \"{name}\". A professionally shot food photograph, perfectly lit, high resolution, food photography style.";

/// JSON type of a recipe field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    TextList,
}

/// One field of the recipe output contract.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldType,
    /// Example value shown to models that only get the schema inline.
    pub hint: &'static str,
}

/// Every field the text model must return. The inline example, the
/// out-of-band schema and [`crate::types::RecipeDraft`] all follow this list.
pub const REQUIRED_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "recipeName", kind: FieldType::Text, hint: "string" },
    FieldSpec { name: "description", kind: FieldType::Text, hint: "string" },
    FieldSpec { name: "prepTime", kind: FieldType::Text, hint: "string (e.g., '15 minutes')" },
    FieldSpec { name: "cookTime", kind: FieldType::Text, hint: "string (e.g., '30 minutes')" },
    FieldSpec { name: "servings", kind: FieldType::Text, hint: "string (e.g., '4 servings')" },
    FieldSpec { name: "ingredients", kind: FieldType::TextList, hint: "string" },
    FieldSpec { name: "steps", kind: FieldType::TextList, hint: "string" },
    FieldSpec { name: "tags", kind: FieldType::TextList, hint: "string" },
];

/// How the output schema reaches the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStyle {
    /// The prompt embeds a literal example JSON object.
    Inline,
    /// The schema travels with the request; the prompt only asks for JSON.
    OutOfBand,
}

/// Build the recipe prompt for a request.
pub fn build_recipe_prompt(request: &GenerationRequest, style: SchemaStyle) -> String {
    let filters = &request.filters;
    let preferences = bullet_list(&[
        format!("Flavor: {}", filters.preference.map_or(ANY, |p| p.as_str())),
        format!("Difficulty: {}", filters.difficulty.map_or(ANY, |d| d.as_str())),
        format!("Dietary Goal: {}", filters.diet.map_or(ANY, |d| d.as_str())),
    ]);
    let preferences = section("My preferences", &preferences);

    // Ingredients go last so user text is never scanned for placeholders.
    let body = render(
        RECIPE_TEMPLATE,
        &[
            ("preferences", preferences.as_str()),
            ("language", request.language.prompt_name()),
            ("ingredients", request.ingredients.as_str()),
        ],
    );

    match style {
        SchemaStyle::Inline => format!(
            "{}\n\nRespond ONLY with a valid JSON object matching this exact structure:\n{}",
            body,
            inline_example()
        ),
        SchemaStyle::OutOfBand => format!(
            "{}\n\nRespond ONLY with a JSON object that follows the provided response schema.",
            body
        ),
    }
}

/// Prompt for the illustrative image of a recipe.
pub fn image_prompt(recipe_name: &str) -> String {
    render(IMAGE_TEMPLATE, &[("name", recipe_name)])
}

/// Structured response schema for providers that accept one.
pub fn recipe_response_schema() -> Value {
    let mut properties = Map::new();
    for field in REQUIRED_FIELDS {
        let schema = match field.kind {
            FieldType::Text => json!({"type": "STRING"}),
            FieldType::TextList => json!({"type": "ARRAY", "items": {"type": "STRING"}}),
        };
        properties.insert(field.name.to_string(), schema);
    }
    let required: Vec<&str> = REQUIRED_FIELDS.iter().map(|f| f.name).collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
        "propertyOrdering": required,
    })
}

fn inline_example() -> String {
    let lines: Vec<String> = REQUIRED_FIELDS
        .iter()
        .map(|f| match f.kind {
            FieldType::Text => format!("    \"{}\": \"{}\"", f.name, f.hint),
            FieldType::TextList => format!("    \"{}\": [\"{}\", \"{}\"]", f.name, f.hint, f.hint),
        })
        .collect();
    format!("{{\n{}\n}}", lines.join(",\n"))
}

/// Replace `{key}` placeholders in `template`. Unknown placeholders are left as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{}}}", key);
        rendered = rendered.replace(&placeholder, value);
    }
    rendered
}

/// Create a `- item` list.
pub fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Label a block of prompt text.
pub fn section(label: &str, content: &str) -> String {
    format!("{}:\n{}", label, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Diet, Difficulty, Language, Preference, RecipeDraft, SearchFilters};

    #[test]
    fn test_prompt_lists_ingredients_verbatim() {
        let request = GenerationRequest::new("chicken, potatoes,  onion...");
        let prompt = build_recipe_prompt(&request, SchemaStyle::Inline);
        assert!(prompt.contains("Ingredients I have: chicken, potatoes,  onion...."));
    }

    #[test]
    fn test_prompt_uses_any_for_missing_filters() {
        let request = GenerationRequest::new("eggs");
        let prompt = build_recipe_prompt(&request, SchemaStyle::Inline);
        assert!(prompt.contains("- Flavor: any"));
        assert!(prompt.contains("- Difficulty: any"));
        assert!(prompt.contains("- Dietary Goal: any"));
    }

    #[test]
    fn test_prompt_states_filter_values() {
        let filters = SearchFilters::new()
            .preference(Preference::Spicy)
            .difficulty(Difficulty::Hard)
            .diet(Diet::HighProtein);
        let request = GenerationRequest::new("tofu").with_filters(filters);
        let prompt = build_recipe_prompt(&request, SchemaStyle::OutOfBand);
        assert!(prompt.contains("- Flavor: spicy"));
        assert!(prompt.contains("- Difficulty: hard"));
        assert!(prompt.contains("- Dietary Goal: high-protein"));
    }

    #[test]
    fn test_prompt_mixed_filters() {
        let filters = SearchFilters::new().diet(Diet::Vegetarian);
        let request = GenerationRequest::new("rice").with_filters(filters);
        let prompt = build_recipe_prompt(&request, SchemaStyle::Inline);
        assert!(prompt.contains("- Flavor: any"));
        assert!(prompt.contains("- Dietary Goal: vegetarian"));
    }

    #[test]
    fn test_prompt_language() {
        let request = GenerationRequest::new("rice").with_language(Language::Zh);
        let prompt = build_recipe_prompt(&request, SchemaStyle::Inline);
        assert!(prompt.contains("The entire recipe must be in Chinese."));
    }

    #[test]
    fn test_inline_style_embeds_every_field() {
        let prompt = build_recipe_prompt(&GenerationRequest::new("x"), SchemaStyle::Inline);
        for field in REQUIRED_FIELDS {
            assert!(prompt.contains(&format!("\"{}\"", field.name)), "{}", field.name);
        }
    }

    #[test]
    fn test_out_of_band_style_omits_example() {
        let prompt = build_recipe_prompt(&GenerationRequest::new("x"), SchemaStyle::OutOfBand);
        assert!(!prompt.contains("\"recipeName\""));
        assert!(prompt.contains("response schema"));
    }

    #[test]
    fn test_inline_example_is_valid_json() {
        let example: Value = serde_json::from_str(&inline_example()).unwrap();
        assert_eq!(example.as_object().unwrap().len(), REQUIRED_FIELDS.len());
    }

    #[test]
    fn test_schema_matches_recipe_draft() {
        let schema = recipe_response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();

        let draft = RecipeDraft {
            recipe_name: String::new(),
            description: String::new(),
            prep_time: String::new(),
            cook_time: String::new(),
            servings: String::new(),
            ingredients: vec![],
            steps: vec![],
            tags: vec![],
        };
        let draft_json = serde_json::to_value(&draft).unwrap();
        let mut draft_keys: Vec<&str> = draft_json
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        let mut sorted_required = required.clone();
        draft_keys.sort();
        sorted_required.sort();
        assert_eq!(draft_keys, sorted_required);

        assert_eq!(schema["properties"]["tags"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["servings"]["type"], "STRING");
    }

    #[test]
    fn test_image_prompt() {
        let prompt = image_prompt("Mapo Tofu");
        assert!(prompt.starts_with("A beautiful, realistic, appetizing photo of \"Mapo Tofu\"."));
        assert!(prompt.contains("professionally shot food photograph, perfectly lit, high resolution"));
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let result = render("{a} + {missing}", &[("a", "1")]);
        assert_eq!(result, "1 + {missing}");
    }

    #[test]
    fn test_bullet_list_and_section() {
        let list = bullet_list(&["one".to_string(), "two".to_string()]);
        assert_eq!(list, "- one\n- two");
        assert_eq!(section("Notes", "x"), "Notes:\nx");
        assert_eq!(bullet_list(&[]), "");
    }
}
