use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::usage_date;
use crate::db::{EntitlementStore, UsageStore};
use crate::entitlement::is_premium;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// Today's counter after the increment.
    Counted(u32),
    /// Premium users are not metered.
    Unmetered,
}

pub struct UsageRecorder {
    entitlements: Arc<dyn EntitlementStore>,
    usage: Arc<dyn UsageStore>,
}

impl UsageRecorder {
    pub fn new(entitlements: Arc<dyn EntitlementStore>, usage: Arc<dyn UsageStore>) -> Self {
        Self { entitlements, usage }
    }

    /// Count one generation for `user_id` on the day of `now`, using the
    /// store's atomic increment.
    pub async fn record(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Recorded, AppError> {
        match self.entitlements.get_subscription(user_id).await {
            Ok(subscription) if is_premium(subscription.as_ref(), now) => {
                return Ok(Recorded::Unmetered);
            }
            Ok(_) => {}
            Err(e) => warn!("Entitlement lookup failed for user {}, metering anyway: {}", user_id, e),
        }

        let count = self.usage.increment_generations(user_id, usage_date(now)).await?;
        info!("Recorded generation {} today for user {}", count, user_id);
        Ok(Recorded::Counted(count))
    }
}
