use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::Recipe;
use crate::error::{AppError, EndpointError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub recipes: Vec<Recipe>,
}

pub async fn generate_recipes(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, EndpointError> {
    let user = state.auth_service.authenticate(&req).map_err(|e| {
        error!("Recipe generation rejected: {}", e);
        EndpointError::internal(e)
    })?;

    let request: GenerateRequest = serde_json::from_slice(&body).map_err(|e| {
        EndpointError::internal(AppError::ValidationError(format!("Malformed request body: {}", e)))
    })?;

    info!("Generating recipes for user {} from {} ingredient(s)", user.id, request.ingredients.len());
    let recipes = state.generator.generate(&request.ingredients).await.map_err(|e| {
        error!("Error in generate-recipes for user {}: {}", user.id, e);
        EndpointError::internal(e)
    })?;

    Ok(HttpResponse::Ok().json(GenerateResponse { recipes }))
}
