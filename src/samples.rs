use rand::seq::IndexedRandom;

use crate::types::{GenerationRequest, Language};

const EN_SETS: &[[&str; 3]] = &[
    ["eggs", "tomatoes", "scallions"],
    ["potatoes", "beef", "onions"],
    ["salmon", "lemon", "butter"],
    ["pasta", "basil", "garlic"],
    ["chicken breast", "broccoli", "carrots"],
    ["shrimp", "garlic", "vermicelli"],
    ["tofu", "mushrooms", "bok choy"],
    ["pork", "cabbage", "ginger"],
    ["eggplant", "bell peppers", "garlic"],
    ["rice", "eggs", "soy sauce"],
];

const ZH_SETS: &[[&str; 3]] = &[
    ["鸡蛋", "番茄", "葱"],
    ["土豆", "牛肉", "洋葱"],
    ["三文鱼", "柠檬", "黄油"],
    ["意大利面", "罗勒", "大蒜"],
    ["鸡胸肉", "西兰花", "胡萝卜"],
    ["虾仁", "蒜蓉", "粉丝"],
    ["豆腐", "香菇", "青菜"],
    ["猪肉", "大白菜", "生姜"],
    ["茄子", "青椒", "蒜"],
    ["米饭", "鸡蛋", "酱油"],
];

/// Fixed ingredient trios offered by the "surprise me" action.
pub fn ingredient_sets(language: Language) -> &'static [[&'static str; 3]] {
    match language {
        Language::En => EN_SETS,
        Language::Zh => ZH_SETS,
    }
}

/// Pick one ingredient trio at random, joined with ", ".
pub fn random_ingredients(language: Language) -> String {
    let sets = ingredient_sets(language);
    // Both tables are non-empty constants.
    sets.choose(&mut rand::rng())
        .map(|set| set.join(", "))
        .unwrap_or_default()
}

/// A request seeded with random ingredients and no filters.
pub fn random_request(language: Language) -> GenerationRequest {
    GenerationRequest::new(random_ingredients(language)).with_language(language)
}
