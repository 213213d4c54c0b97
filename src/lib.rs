pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod entitlement;
pub mod error;
pub mod generation;
pub mod payment;
pub mod quota;
pub mod recipes;

use std::sync::Arc;
use std::time::Duration;
use actix_cors::Cors;
use actix_web::{web, HttpRequest, HttpResponse};

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use crate::config::Settings;

pub use auth::{AuthService, AuthenticatedUser};
pub use db::{DbOperations, InMemoryStore, Stores};
pub use entitlement::EntitlementUpdater;
pub use generation::GenerationGateway;
pub use quota::{QuotaEvaluator, UsageRecorder};

use crate::config::CorsConfig;
use generation::{OpenAiClient, TextGenerator};
use payment::{PaymentGateway, PaystackClient};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub stores: Stores,
    pub auth_service: Arc<AuthService>,
    pub quota: Arc<QuotaEvaluator>,
    pub recorder: Arc<UsageRecorder>,
    pub generator: Arc<GenerationGateway>,
    pub entitlements: Arc<EntitlementUpdater>,
}

impl AppState {
    /// Connect to Postgres and wire the live OpenAI and Paystack clients.
    pub async fn new(config: Settings) -> Result<Self> {
        let db = DbOperations::new_with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(5),
        )
        .await?;

        if config.database.run_migrations {
            db.run_migrations().await?;
        }

        let generator = Arc::new(OpenAiClient::new(&config.generation)?);
        let payments = Arc::new(PaystackClient::new(&config.payment)?);
        Ok(Self::with_services(config, Stores::from_shared(Arc::new(db)), generator, payments))
    }

    pub fn with_services(
        config: Settings,
        stores: Stores,
        text_generator: Arc<dyn TextGenerator>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        let auth_service = Arc::new(AuthService::new(&config.auth));
        let quota = Arc::new(QuotaEvaluator::new(
            stores.entitlements.clone(),
            stores.usage.clone(),
            &config.quota,
        ));
        let recorder = Arc::new(UsageRecorder::new(stores.entitlements.clone(), stores.usage.clone()));
        let generator = Arc::new(GenerationGateway::new(text_generator));
        let entitlements = Arc::new(EntitlementUpdater::new(
            payments,
            stores.users.clone(),
            stores.entitlements.clone(),
        ));

        Self {
            config: Arc::new(config),
            stores,
            auth_service,
            quota,
            recorder,
            generator,
            entitlements,
        }
    }

    /// Authenticate the caller and make sure a `users` row exists for them.
    /// Usage counters and saved recipes reference that row, and payments
    /// resolve the buyer through it.
    pub async fn register_caller(&self, req: &HttpRequest) -> Result<AuthenticatedUser> {
        let user = self.auth_service.authenticate(req)?;
        self.stores.users.ensure_user(user.id, user.email.clone()).await?;
        Ok(user)
    }
}

/// Register every route on an `App` or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/check-usage", web::post().to(quota::handlers::check_usage))
        .route("/track-usage", web::post().to(quota::handlers::track_usage))
        .route("/generate-recipes", web::post().to(generation::handlers::generate_recipes))
        .route("/verify-payment", web::post().to(entitlement::handlers::verify_payment))
        .route("/saved-recipes", web::get().to(recipes::handlers::list_recipes))
        .route("/saved-recipes", web::post().to(recipes::handlers::save_recipe))
        .route("/saved-recipes/{id}", web::delete().to(recipes::handlers::delete_recipe))
        .route("/dashboard", web::get().to(dashboard::dashboard));
}

pub fn build_cors(config: &CorsConfig) -> Cors {
    if !config.enabled {
        return Cors::default();
    }

    let cors = if config.allow_any_origin {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "apikey", "x-client-info"])
    };

    cors.max_age(config.max_age as usize)
}
