use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, models::UserRole};

/// Authenticated caller, decoded from a bearer token. Token issuance lives
/// in a separate identity service; this API only consumes tokens.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

pub fn ensure_role(user: &AuthUser, roles: &[UserRole]) -> Result<(), AppError> {
    if !roles.contains(&user.role) {
        return Err(AppError::Authorization(format!(
            "requires one of roles {:?}",
            roles.iter().map(|r| r.as_str()).collect::<Vec<_>>()
        )));
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[UserRole::Admin])
}

pub fn ensure_admin_or_cashier(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[UserRole::Admin, UserRole::Cashier])
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.role.is_staff() {
        return Err(AppError::Authorization("staff only".into()));
    }
    Ok(())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Validation("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Validation("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Validation("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        decode_user(token)
    }
}

/// Shared with the WebSocket route, where the token arrives as a query
/// parameter because browsers cannot set headers on WS upgrades.
pub fn decode_user(token: &str) -> Result<AuthUser, AppError> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Validation("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Validation("Invalid user id in token".into()))?;

    let role = UserRole::parse(&decoded.claims.role)
        .ok_or_else(|| AppError::Validation("Unknown role in token".into()))?;

    Ok(AuthUser { user_id, role })
}
