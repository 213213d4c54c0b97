//! Payment gateway boundary.

mod paystack;

use async_trait::async_trait;

use crate::error::AppError;

pub use paystack::PaystackClient;

/// A transaction the gateway confirmed as successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub reference: String,
    /// Minor currency units (e.g. kobo).
    pub amount: i64,
    pub currency: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Confirm `reference` with the gateway. Anything other than a
    /// successful transaction is an error; this never degrades.
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, AppError>;
}
