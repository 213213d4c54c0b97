use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

use super::{PaymentGateway, VerifiedPayment};
use crate::config::PaymentConfig;
use crate::error::{AppError, ExternalError, PaymentError};

pub struct PaystackClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct VerifyEnvelope {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<TransactionData>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    status: String,
    #[serde(default)]
    reference: Option<String>,
    amount: i64,
    currency: String,
}

impl PaystackClient {
    pub fn new(config: &PaymentConfig) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid payment base URL: {}", e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            secret_key: config.secret_key.clone(),
            base_url,
        })
    }

    fn verify_url(&self, reference: &str) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError("Payment base URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(["transaction", "verify", reference]);
        Ok(url)
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, AppError> {
        if self.secret_key.is_empty() {
            return Err(AppError::ConfigError("Paystack secret key not configured".into()));
        }

        let res = self.http
            .get(self.verify_url(reference)?)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let status = res.status();
        let envelope: VerifyEnvelope = res.json().await.map_err(|e| {
            error!("Unreadable verification response ({}): {}", status, e);
            ExternalError::ResponseError { status: status.as_u16(), message: e.to_string() }
        })?;

        match envelope.data {
            Some(data) if envelope.status && data.status == "success" => {
                info!("Payment {} verified: {} {}", reference, data.amount, data.currency);
                Ok(VerifiedPayment {
                    reference: data.reference.unwrap_or_else(|| reference.to_string()),
                    amount: data.amount,
                    currency: data.currency,
                })
            }
            data => {
                warn!(
                    "Payment {} not verified: gateway status {}, transaction status {:?}, message {:?}",
                    reference,
                    envelope.status,
                    data.map(|d| d.status),
                    envelope.message
                );
                Err(PaymentError::VerificationFailed.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> PaystackClient {
        PaystackClient::new(&PaymentConfig {
            secret_key: "sk_test".to_string(),
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_reference_is_a_single_path_segment() {
        let url = client("https://api.paystack.co").verify_url("fridgy_monthly_1/../x?y").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.paystack.co/transaction/verify/fridgy_monthly_1%2F..%2Fx%3Fy"
        );
    }

    #[test]
    fn test_base_url_with_trailing_slash() {
        let url = client("http://localhost:9000/").verify_url("ref_1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/transaction/verify/ref_1");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = PaystackClient::new(&PaymentConfig {
            secret_key: "sk_test".to_string(),
            base_url: "not a url".to_string(),
            timeout_secs: 5,
        });
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
