use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info};

use super::PaymentConfirmation;
use crate::error::{AppError, EndpointError};
use crate::AppState;

pub async fn verify_payment(
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, EndpointError> {
    let confirmation: PaymentConfirmation = serde_json::from_slice(&body).map_err(|e| {
        EndpointError::bad_request(AppError::ValidationError(format!("Malformed request body: {}", e)))
    })?;

    info!("Verifying payment {} for {:?} plan", confirmation.reference, confirmation.plan);
    state
        .entitlements
        .apply_payment(&confirmation, Utc::now())
        .await
        .map_err(|e| {
            error!("Payment verification error for {}: {}", confirmation.reference, e);
            EndpointError::bad_request(e)
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Subscription activated successfully"
    })))
}
