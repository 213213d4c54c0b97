//! Daily generation quota for free users.
//!
//! Days are UTC calendar days: a free user's counter resets at 00:00 UTC.

pub mod handlers;
mod evaluator;
mod recorder;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub use evaluator::QuotaEvaluator;
pub use recorder::{Recorded, UsageRecorder};

pub const DAILY_LIMIT: u32 = 3;

/// `remaining` value reported for users without a limit.
pub const UNLIMITED: i64 = -1;

/// The usage-tracking day that `now` falls in.
pub fn usage_date(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaDecision {
    pub can_generate: bool,
    pub is_premium: bool,
    pub remaining: i64,
    pub generations_today: u32,
}

impl QuotaDecision {
    pub fn premium() -> Self {
        Self {
            can_generate: true,
            is_premium: true,
            remaining: UNLIMITED,
            generations_today: 0,
        }
    }

    pub fn free(generations_today: u32, daily_limit: u32) -> Self {
        let remaining = daily_limit.saturating_sub(generations_today);
        Self {
            can_generate: remaining > 0,
            is_premium: false,
            remaining: i64::from(remaining),
            generations_today,
        }
    }
}
