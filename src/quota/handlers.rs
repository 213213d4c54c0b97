use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use super::Recorded;
use crate::error::EndpointError;
use crate::AppState;

pub async fn check_usage(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, EndpointError> {
    let user = state.auth_service.authenticate(&req).map_err(|e| {
        error!("Usage check error: {}", e);
        EndpointError::bad_request(e)
    })?;

    // The quota check fails open, so registering the caller must not block it.
    if let Err(e) = state.stores.users.ensure_user(user.id, user.email.clone()).await {
        warn!("Could not register user {}: {}", user.id, e);
    }

    let decision = state.quota.evaluate(user.id, Utc::now()).await.map_err(|e| {
        error!("Usage check error for user {}: {}", user.id, e);
        EndpointError::bad_request(e)
    })?;

    Ok(HttpResponse::Ok().json(decision))
}

pub async fn track_usage(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, EndpointError> {
    let user = state.register_caller(&req).await.map_err(|e| {
        error!("Usage tracking error: {}", e);
        EndpointError::bad_request(e)
    })?;

    match state.recorder.record(user.id, Utc::now()).await {
        Ok(Recorded::Unmetered) => info!("Skipped metering for premium user {}", user.id),
        Ok(Recorded::Counted(_)) => {}
        Err(e) => {
            error!("Usage tracking error for user {}: {}", user.id, e);
            return Err(EndpointError::bad_request(e));
        }
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
