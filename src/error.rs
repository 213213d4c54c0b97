use thiserror::Error;
use actix_web::{ResponseError, HttpResponse, http::StatusCode};
use serde_json::json;
use std::fmt;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("External service error: {0}")]
    ExternalError(#[from] ExternalError),

    #[error("{0}")]
    PaymentError(#[from] PaymentError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::DatabaseError(DatabaseError::NotFound),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::DatabaseError(DatabaseError::ConnectionError(err.to_string()))
            }
            _ => AppError::DatabaseError(DatabaseError::QueryError(err.to_string())),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::DatabaseError(DatabaseError::MigrationError(err.to_string()))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalError(ExternalError::RequestFailed(err.to_string()))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::AuthError(AuthError::TokenExpired)
            }
            _ => AppError::AuthError(AuthError::InvalidToken),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

fn error_body(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message }))
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        error_body(self.status_code(), self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PaymentError(PaymentError::UserNotFound) => StatusCode::NOT_FOUND,
            AppError::PaymentError(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::DatabaseError(DatabaseError::NotFound) => StatusCode::NOT_FOUND,
            AppError::ExternalError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned by the four metered endpoints, whose clients expect one
/// fixed failure status per endpoint regardless of the underlying cause.
#[derive(Debug)]
pub struct EndpointError {
    status: StatusCode,
    source: AppError,
}

impl EndpointError {
    pub fn bad_request(source: AppError) -> Self {
        Self { status: StatusCode::BAD_REQUEST, source }
    }

    pub fn internal(source: AppError) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, source }
    }
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.source.fmt(f)
    }
}

impl ResponseError for EndpointError {
    fn error_response(&self) -> HttpResponse {
        error_body(self.status, self.source.to_string())
    }

    fn status_code(&self) -> StatusCode {
        self.status
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authorization header")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

#[derive(Error, Debug)]
pub enum ExternalError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream returned {status}: {message}")]
    ResponseError { status: u16, message: String },
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment verification failed")]
    VerificationFailed,

    #[error("User not found")]
    UserNotFound,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Record not found")]
    NotFound,

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}
