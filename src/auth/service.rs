use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AppError, AuthError};

/// Claims carried by access tokens of the managed auth service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // User ID
    pub exp: i64,     // Expiration time
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
}

/// The caller a request was authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: Option<String>,
}

pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.as_str()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Resolve the caller from the `Authorization: Bearer <token>` header.
    pub fn authenticate(&self, req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
        let token = bearer_token(req).ok_or(AuthError::MissingToken)?;
        self.validate_token(token)
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser { id, email: claims.email })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.strip_prefix("Bearer ").unwrap_or(h).trim())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test_secret".to_string(),
            audience: "authenticated".to_string(),
        }
    }

    fn token(sub: &str, secret: &str, aud: &str, expires_in: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            exp: (now + expires_in).timestamp(),
            iat: Some(now.timestamp()),
            email: Some("cook@example.com".to_string()),
            aud: Some(aud.to_string()),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_valid_token_resolves_user() {
        let service = AuthService::new(&config());
        let id = Uuid::new_v4();
        let token = token(&id.to_string(), "test_secret", "authenticated", Duration::hours(1));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();
        let user = service.authenticate(&req).unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("cook@example.com"));
    }

    #[test]
    fn test_missing_header() {
        let service = AuthService::new(&config());
        let req = TestRequest::default().to_http_request();

        assert!(matches!(
            service.authenticate(&req),
            Err(AppError::AuthError(AuthError::MissingToken))
        ));
    }

    #[test]
    fn test_rejects_bad_tokens() {
        let service = AuthService::new(&config());
        let id = Uuid::new_v4().to_string();

        let wrong_secret = token(&id, "other_secret", "authenticated", Duration::hours(1));
        assert!(matches!(
            service.validate_token(&wrong_secret),
            Err(AppError::AuthError(AuthError::InvalidToken))
        ));

        let wrong_audience = token(&id, "test_secret", "anon", Duration::hours(1));
        assert!(matches!(
            service.validate_token(&wrong_audience),
            Err(AppError::AuthError(AuthError::InvalidToken))
        ));

        let expired = token(&id, "test_secret", "authenticated", Duration::hours(-2));
        assert!(matches!(
            service.validate_token(&expired),
            Err(AppError::AuthError(AuthError::TokenExpired))
        ));

        let not_a_uuid = token("service-role", "test_secret", "authenticated", Duration::hours(1));
        assert!(matches!(
            service.validate_token(&not_a_uuid),
            Err(AppError::AuthError(AuthError::InvalidToken))
        ));
    }
}
