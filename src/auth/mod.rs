//! Bearer-token authentication and role gating.
//!
//! Credential storage and login live in an external identity provider; this
//! module only verifies the signed token it issues and exposes the embedded
//! principal (`{subject id, role}`) to handlers. Role checks happen at the
//! router layer via [`AuthRouterExt`]; ownership checks (is this *your*
//! order?) stay in the service layer where they can collapse into 404s.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Closed set of principal roles. Kept as a tagged enum rather than free-form
/// strings so role-variant behavior is matched exhaustively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Customer,
    Delivery,
    Admin,
}

/// Claim structure for bearer tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated principal extracted from the bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized("Missing authentication".to_string()))
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            token_expiration,
        }
    }
}

impl From<&crate::config::AppConfig> for AuthConfig {
    fn from(cfg: &crate::config::AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(24 * 60 * 60),
        )
    }
}

/// Validates incoming bearer tokens; can also mint them, standing in for the
/// external identity provider in tests and local development.
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Validate a bearer token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.jwt_audience.clone()]);
        validation.set_issuer(&[self.config.jwt_issuer.clone()]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ServiceError::Unauthorized(format!("Invalid token: {e}")))?;

        Ok(data.claims)
    }

    /// Issue a signed token for the given principal
    pub fn issue_token(&self, subject: Uuid, role: Role) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| ServiceError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("Token creation failed: {e}")))
    }
}

/// Extract authentication info from request headers
fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, ServiceError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ServiceError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| ServiceError::Unauthorized("Expected bearer token".to_string()))?;

    let claims = auth_service.validate_token(token)?;

    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ServiceError::Unauthorized("Invalid subject in token".to_string()))?;

    Ok(AuthUser {
        id,
        role: claims.role,
    })
}

/// Authentication middleware that validates the bearer token and stores the
/// principal in request extensions
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, ServiceError> {
    let auth_service = request
        .extensions()
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or_else(|| {
            ServiceError::InternalError("Authentication service not available".to_string())
        })?;

    let user = extract_auth_from_headers(request.headers(), &auth_service)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Role middleware rejecting principals whose role is not in the allowed set
pub async fn role_middleware(
    State(allowed): State<Vec<Role>>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ServiceError::Unauthorized("Missing authentication".to_string()))?;

    if !allowed.contains(&user.role) {
        return Err(ServiceError::Forbidden(format!(
            "Role '{}' may not perform this action",
            user.role
        )));
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: Role) -> Self;
    fn with_any_role(self, roles: &[Role]) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: Role) -> Self {
        self.with_any_role(&[role])
    }

    fn with_any_role(self, roles: &[Role]) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            roles.to_vec(),
            role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        AuthService::new(AuthConfig::new(
            "a_test_secret_that_is_long_enough_for_validation".to_string(),
            "washline-auth".to_string(),
            "washline-api".to_string(),
            Duration::from_secs(3600),
        ))
    }

    #[test]
    fn issued_token_round_trips() {
        let svc = test_service();
        let subject = Uuid::new_v4();
        let token = svc.issue_token(subject, Role::Delivery).unwrap();

        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(claims.sub, subject.to_string());
        assert_eq!(claims.role, Role::Delivery);
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let svc = test_service();
        let err = svc.validate_token("not-a-token").unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let svc = test_service();
        let other = AuthService::new(AuthConfig::new(
            "a_completely_different_secret_also_long_enough".to_string(),
            "washline-auth".to_string(),
            "washline-api".to_string(),
            Duration::from_secs(3600),
        ));

        let token = other.issue_token(Uuid::new_v4(), Role::Admin).unwrap();
        assert!(svc.validate_token(&token).is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Delivery).unwrap(), "\"delivery\"");
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
