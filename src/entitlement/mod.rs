//! Entitlements: who is premium, and how a verified payment changes that.

pub mod handlers;
mod updater;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{PlanStatus, Subscription};
use crate::error::AppError;

pub use updater::{EntitlementUpdater, PaymentConfirmation};

/// The single definition of premium status. Expired paid rows are left in
/// place and simply stop counting, so this is always evaluated live.
pub fn is_premium(subscription: Option<&Subscription>, now: DateTime<Utc>) -> bool {
    subscription.is_some_and(|sub| {
        sub.plan_status != PlanStatus::Free
            && sub.subscription_expiry.is_some_and(|expiry| expiry > now)
    })
}

/// A plan that can be purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Monthly,
    Yearly,
}

impl Plan {
    fn period(&self) -> Months {
        match self {
            Plan::Monthly => Months::new(1),
            Plan::Yearly => Months::new(12),
        }
    }

    /// Expiry for a purchase made at `now`. Periods never stack on an
    /// existing expiry. Month ends clamp: Jan 31 + 1 month is the last day of
    /// February, and Feb 29 + 1 year is Feb 28.
    pub fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
        now.checked_add_months(self.period())
            .ok_or_else(|| AppError::InternalError(format!("expiry out of range for {}", now)))
    }
}

impl From<Plan> for PlanStatus {
    fn from(plan: Plan) -> Self {
        match plan {
            Plan::Monthly => PlanStatus::Monthly,
            Plan::Yearly => PlanStatus::Yearly,
        }
    }
}
