//! Localized user-facing strings for generation outcomes and filter labels.
//!
//! Keys are dotted paths such as `error.quotaExceeded` or
//! `filters.diet.low-fat`. Lookups that miss return the key itself so a
//! missing translation is visible rather than blank.

use crate::error::GenerationError;
use crate::types::Language;

const EN: &[(&str, &str)] = &[
    ("filters.preference.title", "Flavor Profile"),
    ("filters.preference.chinese", "Chinese"),
    ("filters.preference.western", "Western"),
    ("filters.preference.spicy", "Spicy"),
    ("filters.preference.light", "Light"),
    ("filters.difficulty.title", "Difficulty"),
    ("filters.difficulty.easy", "Easy"),
    ("filters.difficulty.medium", "Medium"),
    ("filters.difficulty.hard", "Hard"),
    ("filters.diet.title", "Dietary Goal"),
    ("filters.diet.balanced", "Balanced"),
    ("filters.diet.low-fat", "Low-Fat"),
    ("filters.diet.high-protein", "High-Protein"),
    ("filters.diet.vegetarian", "Vegetarian"),
    ("modal.title", "Generation Result"),
    ("modal.prepTime", "Prep Time"),
    ("modal.cookTime", "Cook Time"),
    ("modal.servings", "Servings"),
    ("modal.ingredients", "Ingredients"),
    ("modal.instructions", "Instructions"),
    ("modal.error.title", "Oops, something went wrong!"),
    ("error.noIngredients", "Please enter the ingredients you have."),
    ("error.keyMissing", "No API key is configured. Set {{var}} and restart."),
    ("error.keyVar", "the API key variable"),
    ("error.invalidRecipeFormat", "The AI response was incomplete. Please try again."),
    ("error.emptyResponse", "The AI returned an empty response. Please try again."),
    ("error.imageFailed", "The recipe was generated, but the image could not be created. Please try again."),
    ("error.quotaExceeded", "API quota is exceeded. Check billing or try later."),
    ("error.invalidKey", "The API key is invalid or missing. Update the key."),
    ("error.unknown", "An unknown error occurred. Please try again later."),
];

const ZH: &[(&str, &str)] = &[
    ("filters.preference.title", "口味偏好"),
    ("filters.preference.chinese", "中餐"),
    ("filters.preference.western", "西餐"),
    ("filters.preference.spicy", "香辣"),
    ("filters.preference.light", "清淡"),
    ("filters.difficulty.title", "烹饪难度"),
    ("filters.difficulty.easy", "简单"),
    ("filters.difficulty.medium", "中等"),
    ("filters.difficulty.hard", "困难"),
    ("filters.diet.title", "膳食目标"),
    ("filters.diet.balanced", "均衡"),
    ("filters.diet.low-fat", "低脂"),
    ("filters.diet.high-protein", "高蛋白"),
    ("filters.diet.vegetarian", "素食"),
    ("modal.title", "生成结果"),
    ("modal.prepTime", "准备时间"),
    ("modal.cookTime", "烹饪时间"),
    ("modal.servings", "份量"),
    ("modal.ingredients", "所需食材"),
    ("modal.instructions", "制作步骤"),
    ("modal.error.title", "哎呀，出错了！"),
    ("error.noIngredients", "请输入你拥有的食材。"),
    ("error.keyMissing", "未配置 API Key，请设置 {{var}} 后重启。"),
    ("error.keyVar", "API Key 环境变量"),
    ("error.invalidRecipeFormat", "AI 返回的数据不完整，请重试。"),
    ("error.emptyResponse", "AI 返回了空结果，请重试。"),
    ("error.imageFailed", "菜谱已生成，但图片生成失败，请重试。"),
    ("error.quotaExceeded", "API 配额已用完，请检查账单或稍后再试。"),
    ("error.invalidKey", "API Key 无效或缺失，请更新密钥。"),
    ("error.unknown", "发生未知错误，请稍后再试。"),
];

fn table(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::En => EN,
        Language::Zh => ZH,
    }
}

/// Look up `key`, returning the key itself when it has no translation.
pub fn t(language: Language, key: &str) -> String {
    lookup(language, key).unwrap_or(key).to_string()
}

/// Look up `key` and substitute `{{name}}` placeholders.
pub fn t_with(language: Language, key: &str, replacements: &[(&str, &str)]) -> String {
    let mut text = t(language, key);
    for (name, value) in replacements {
        text = text.replace(&format!("{{{{{}}}}}", name), value);
    }
    text
}

fn lookup(language: Language, key: &str) -> Option<&'static str> {
    table(language)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Localized message for a failed generation, falling back to the generic
/// unknown-error text for anything without its own entry.
///
/// Placeholders are filled with generic wording; callers that know the
/// concrete variable name can use [`t_with`] instead.
pub fn user_message(error: &GenerationError, language: Language) -> String {
    let key = match lookup(language, error.kind().message_key()) {
        Some(_) => error.kind().message_key(),
        None => "error.unknown",
    };
    let key_var = t(language, "error.keyVar");
    t_with(language, key, &[("var", key_var.as_str())])
}
