#![allow(dead_code)]

use chrono::{Duration, Utc};
use fridgy_server::auth::Claims;
use fridgy_server::generation::{OpenAiClient, TextGenerator};
use fridgy_server::payment::{PaymentGateway, PaystackClient};
use fridgy_server::{AppState, InMemoryStore, Settings, Stores};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret";

pub fn settings(upstream: &str) -> Settings {
    let mut settings = Settings::new_for_test().expect("Failed to load test config");
    settings.generation.api_key = "sk-test".to_string();
    settings.generation.base_url = format!("{}/v1", upstream);
    settings.payment.secret_key = "sk_test_paystack".to_string();
    settings.payment.base_url = upstream.to_string();
    settings
}

/// State backed by `store`, with live clients pointed at `upstream`
/// (usually a wiremock server).
pub fn state_with(settings: Settings, store: Arc<InMemoryStore>) -> AppState {
    state_with_stores(settings, Stores::from_shared(store))
}

pub fn state_with_stores(settings: Settings, stores: Stores) -> AppState {
    let generator: Arc<dyn TextGenerator> =
        Arc::new(OpenAiClient::new(&settings.generation).expect("generation client"));
    let payments: Arc<dyn PaymentGateway> =
        Arc::new(PaystackClient::new(&settings.payment).expect("payment client"));
    AppState::with_services(settings, stores, generator, payments)
}

pub fn token_for(user_id: Uuid, email: &str) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: Some(now.timestamp()),
        email: Some(email.to_string()),
        aud: Some("authenticated".to_string()),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
        .expect("Failed to sign token")
}

pub fn bearer(user_id: Uuid, email: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(user_id, email)))
}
