use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::Plan;
use crate::db::{EntitlementStore, Subscription, UserDirectory};
use crate::error::{AppError, PaymentError};
use crate::payment::PaymentGateway;

/// Payment callback payload forwarded by the client after checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfirmation {
    pub reference: String,
    pub plan: Plan,
    pub email: String,
}

pub struct EntitlementUpdater {
    payments: Arc<dyn PaymentGateway>,
    users: Arc<dyn UserDirectory>,
    entitlements: Arc<dyn EntitlementStore>,
}

impl EntitlementUpdater {
    pub fn new(
        payments: Arc<dyn PaymentGateway>,
        users: Arc<dyn UserDirectory>,
        entitlements: Arc<dyn EntitlementStore>,
    ) -> Self {
        Self { payments, users, entitlements }
    }

    /// Verify the payment, then overwrite the user's entitlement with a fresh
    /// period starting at `now`. Every failure is returned; nothing is written
    /// unless the gateway confirmed the transaction.
    pub async fn apply_payment(
        &self,
        confirmation: &PaymentConfirmation,
        now: DateTime<Utc>,
    ) -> Result<Subscription, AppError> {
        let reference = confirmation.reference.trim();
        let email = confirmation.email.trim();
        if reference.is_empty() {
            return Err(AppError::ValidationError("Payment reference is required".into()));
        }
        if email.is_empty() {
            return Err(AppError::ValidationError("Email is required".into()));
        }

        let payment = self.payments.verify(reference).await?;

        let user = self.users.find_user_by_email(email).await?.ok_or_else(|| {
            warn!("Verified payment {} for unknown email {}", reference, email);
            PaymentError::UserNotFound
        })?;

        let subscription = Subscription {
            user_id: user.id,
            email: Some(email.to_string()),
            plan_status: confirmation.plan.into(),
            subscription_expiry: Some(confirmation.plan.expiry_from(now)?),
            paystack_reference: Some(payment.reference),
            amount_paid: Some(payment.amount),
            currency: Some(payment.currency),
            updated_at: now,
        };
        self.entitlements.upsert_subscription(&subscription).await?;

        info!(
            "Activated {} plan for user {} until {:?}",
            subscription.plan_status, user.id, subscription.subscription_expiry
        );
        Ok(subscription)
    }
}
