use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::PlanStatus;
use crate::entitlement::is_premium;
use crate::error::AppError;
use crate::quota::{usage_date, QuotaDecision};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub email: Option<String>,
    pub plan_status: PlanStatus,
    pub subscription_expiry: Option<DateTime<Utc>>,
    pub is_premium: bool,
    pub generations_today: u32,
    pub remaining: i64,
    pub saved_recipes: u64,
}

/// Account overview: plan, today's usage and collection size. Unlike the
/// quota check this does not fail open; it reports lookup errors.
pub async fn dashboard(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.auth_service.authenticate(&req)?;
    let now = Utc::now();

    let subscription = state.stores.entitlements.get_subscription(user.id).await?;
    let generations_today = state.stores.usage.generations_on(user.id, usage_date(now)).await?;
    let saved_recipes = state.stores.recipes.count_recipes(user.id).await?;

    let premium = is_premium(subscription.as_ref(), now);
    let quota = if premium {
        QuotaDecision::premium()
    } else {
        QuotaDecision::free(generations_today, state.quota.daily_limit())
    };

    let summary = DashboardSummary {
        email: user.email,
        plan_status: subscription.as_ref().map_or(PlanStatus::Free, |s| s.plan_status),
        subscription_expiry: subscription.and_then(|s| s.subscription_expiry),
        is_premium: premium,
        generations_today,
        remaining: quota.remaining,
        saved_recipes,
    };

    Ok(HttpResponse::Ok().json(summary))
}
