use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{usage_date, QuotaDecision};
use crate::config::QuotaConfig;
use crate::db::{EntitlementStore, UsageStore};
use crate::entitlement::is_premium;
use crate::error::AppError;

pub struct QuotaEvaluator {
    entitlements: Arc<dyn EntitlementStore>,
    usage: Arc<dyn UsageStore>,
    daily_limit: u32,
    fail_open: bool,
}

impl QuotaEvaluator {
    pub fn new(
        entitlements: Arc<dyn EntitlementStore>,
        usage: Arc<dyn UsageStore>,
        config: &QuotaConfig,
    ) -> Self {
        Self {
            entitlements,
            usage,
            daily_limit: config.daily_limit,
            fail_open: config.fail_open,
        }
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Decide whether `user_id` may generate now. Read-only.
    ///
    /// With `fail_open`, a failed lookup allows generation and reports a full
    /// day's allowance instead of returning the error.
    pub async fn evaluate(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<QuotaDecision, AppError> {
        match self.lookup(user_id, now).await {
            Ok(decision) => Ok(decision),
            Err(e) if self.fail_open => {
                warn!("Quota lookup failed for user {}, allowing generation: {}", user_id, e);
                Ok(QuotaDecision::free(0, self.daily_limit))
            }
            Err(e) => Err(e),
        }
    }

    async fn lookup(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<QuotaDecision, AppError> {
        let subscription = self.entitlements.get_subscription(user_id).await?;
        if is_premium(subscription.as_ref(), now) {
            return Ok(QuotaDecision::premium());
        }

        let generations = self.usage.generations_on(user_id, usage_date(now)).await?;
        debug!("User {} has {} generation(s) today", user_id, generations);
        Ok(QuotaDecision::free(generations, self.daily_limit))
    }
}
