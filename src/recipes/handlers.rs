use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::db::SavedRecipe;
use crate::error::{AppError, DatabaseError};
use crate::generation::Recipe;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn save_recipe(
    req: HttpRequest,
    body: web::Json<Recipe>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.register_caller(&req).await?;
    let recipe = body.into_inner();
    super::validate(&recipe)?;

    let saved = SavedRecipe::new(user.id, recipe);
    state.stores.recipes.insert_recipe(&saved).await?;
    info!("User {} saved recipe {}", user.id, saved.id);

    Ok(HttpResponse::Created().json(saved))
}

pub async fn list_recipes(
    req: HttpRequest,
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.auth_service.authenticate(&req)?;
    let recipes = state.stores.recipes.list_recipes(user.id).await?;
    let total = recipes.len();
    let recipes = super::search(recipes, query.q.as_deref());

    Ok(HttpResponse::Ok().json(json!({ "recipes": recipes, "total": total })))
}

pub async fn delete_recipe(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.auth_service.authenticate(&req)?;
    let recipe_id = super::parse_id(&path)?;

    if !state.stores.recipes.delete_recipe(user.id, recipe_id).await? {
        warn!("User {} tried to delete missing or foreign recipe {}", user.id, recipe_id);
        return Err(DatabaseError::NotFound.into());
    }

    info!("User {} deleted recipe {}", user.id, recipe_id);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
