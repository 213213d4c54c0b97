//! Generation gateway.
//!
//! Turns an ingredient list into recipes by asking an external text
//! generation service for a JSON array. Replies that cannot be read as
//! recipes, and upstream failures, are mapped to a single deterministic
//! placeholder recipe so callers always receive at least one recipe.

pub mod handlers;
mod openai;
mod prompt;

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AppError;

pub use openai::OpenAiClient;
pub use prompt::{build_prompt, SYSTEM_PROMPT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Easy", alias = "EASY")]
    Easy,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "Hard", alias = "HARD")]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("unknown difficulty '{}'", s)),
        }
    }
}

/// Display value of a nutrition field; models return either `300` or `"15g"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NutritionValue {
    Number(serde_json::Number),
    Text(String),
}

impl From<u32> for NutritionValue {
    fn from(value: u32) -> Self {
        NutritionValue::Number(value.into())
    }
}

impl From<&str> for NutritionValue {
    fn from(value: &str) -> Self {
        NutritionValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: NutritionValue,
    pub protein: NutritionValue,
    pub carbs: NutritionValue,
    pub fat: NutritionValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: String,
    #[serde(deserialize_with = "lenient_servings")]
    pub servings: u32,
    pub difficulty: Difficulty,
    pub nutrition: Nutrition,
}

/// Models sometimes write servings as `4.0` or `"4"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Servings {
    Whole(u32),
    Fractional(f64),
    Text(String),
}

fn lenient_servings<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Servings::deserialize(deserializer)? {
        Servings::Whole(n) => Ok(n),
        Servings::Fractional(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f) => {
            Ok(f as u32)
        }
        Servings::Fractional(f) => Err(de::Error::custom(format!("invalid servings {}", f))),
        Servings::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid servings '{}'", text))),
    }
}

/// What came back from the text generation service.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Success(Vec<Recipe>),
    Unparseable(String),
}

impl GenerationOutcome {
    /// Read a model reply as a non-empty JSON array of recipes. A reply
    /// wrapped in one Markdown code fence is unwrapped first.
    pub fn from_reply(raw: &str) -> Self {
        match serde_json::from_str::<Vec<Recipe>>(strip_code_fence(raw)) {
            Ok(recipes) if !recipes.is_empty() => GenerationOutcome::Success(recipes),
            _ => GenerationOutcome::Unparseable(raw.to_string()),
        }
    }

    pub fn into_recipes(self, ingredients: &[String]) -> Vec<Recipe> {
        match self {
            GenerationOutcome::Success(recipes) => recipes,
            GenerationOutcome::Unparseable(raw) => {
                warn!(
                    "Failed to parse generated recipes ({} bytes), using fallback recipe",
                    raw.len()
                );
                vec![fallback_recipe(ingredients)]
            }
        }
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening fence line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

/// The placeholder recipe served whenever the model reply is unusable.
pub fn fallback_recipe(ingredients: &[String]) -> Recipe {
    Recipe {
        title: "Custom Recipe with Your Ingredients".to_string(),
        ingredients: ingredients.iter().map(|ing| format!("1 cup {}", ing)).collect(),
        instructions: vec![
            "Prepare and clean all ingredients".to_string(),
            "Follow basic cooking principles for each ingredient".to_string(),
            "Combine ingredients thoughtfully".to_string(),
            "Cook until done and season to taste".to_string(),
        ],
        cooking_time: "30 minutes".to_string(),
        servings: 4,
        difficulty: Difficulty::Medium,
        nutrition: Nutrition {
            calories: 300u32.into(),
            protein: "15g".into(),
            carbs: "30g".into(),
            fat: "10g".into(),
        },
    }
}

/// A chat-style text generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AppError>;
}

pub struct GenerationGateway {
    generator: Arc<dyn TextGenerator>,
}

impl GenerationGateway {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate recipes for `ingredients`. Blank entries are dropped first.
    ///
    /// Fails only on an empty ingredient list or a missing service
    /// configuration. Upstream transport errors degrade to the fallback recipe.
    pub async fn generate(&self, ingredients: &[String]) -> Result<Vec<Recipe>, AppError> {
        let ingredients: Vec<String> = ingredients
            .iter()
            .map(|ing| ing.trim())
            .filter(|ing| !ing.is_empty())
            .map(String::from)
            .collect();
        if ingredients.is_empty() {
            return Err(AppError::ValidationError("Ingredients are required".into()));
        }

        let prompt = build_prompt(&ingredients);
        let outcome = match self.generator.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => GenerationOutcome::from_reply(&reply),
            Err(AppError::ExternalError(e)) => {
                warn!("Text generation service failed: {}", e);
                GenerationOutcome::Unparseable(String::new())
            }
            Err(e) => return Err(e),
        };

        let recipes = outcome.into_recipes(&ingredients);
        info!("Generated {} recipe(s) from {} ingredient(s)", recipes.len(), ingredients.len());
        Ok(recipes)
    }
}
