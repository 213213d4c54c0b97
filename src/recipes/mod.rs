//! A user's saved recipe collection.

pub mod handlers;

use uuid::Uuid;

use crate::db::SavedRecipe;
use crate::error::AppError;
use crate::generation::Recipe;

pub fn validate(recipe: &Recipe) -> Result<(), AppError> {
    if recipe.title.trim().is_empty() {
        return Err(AppError::ValidationError("Recipe title is required".into()));
    }
    if recipe.ingredients.is_empty() {
        return Err(AppError::ValidationError("Recipe must list its ingredients".into()));
    }
    Ok(())
}

/// Keep the recipes matching `query`, preserving order.
pub fn search(recipes: Vec<SavedRecipe>, query: Option<&str>) -> Vec<SavedRecipe> {
    match query {
        Some(term) => recipes.into_iter().filter(|recipe| recipe.matches(term)).collect(),
        None => recipes,
    }
}

pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::ValidationError(format!("Invalid recipe id '{}'", raw)))
}
