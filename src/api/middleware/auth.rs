use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::Utc;

use super::state::AppState;
use crate::error::AppError;
use crate::models::user::User;
use crate::services::token;

/// The member making the request, loaded from a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

/// An authenticated member holding the `admin` role
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user: User,
}

/// Extracts the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Token is missing!".to_string()))?;

        let claims = token::verify(token, state.jwt_secret(), Utc::now()).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized("Token is invalid!".to_string())
        })?;

        let user = User::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Token is invalid!".to_string()))?;

        Ok(AuthUser { user })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let AuthUser { user } = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(AdminUser { user })
    }
}
