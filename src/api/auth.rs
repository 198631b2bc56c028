use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::extract::{optional, required, AppJson};
use crate::api::middleware::{AppState, AuthUser};
use crate::error::{AppError, Result};
use crate::models::user::{
    normalize_email, CreateUserData, MemberSummary, MembershipPlan, Role, User,
};
use crate::services::{password, token};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub business_category: Option<String>,
    pub phone: Option<String>,
    pub chapter: Option<String>,
    pub membership_plan: Option<MembershipPlan>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
    pub name: String,
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

async fn hash(password: String) -> Result<String> {
    password::hash_password_async(password)
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

async fn verify(password: String, stored: String) -> Result<bool> {
    password::verify_password_async(password, stored)
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// Register a new member
async fn register(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let name = required(req.name, "name")?;
    let email = normalize_email(&required(req.email, "email")?);
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("password is required".to_string()))?;

    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    validate_password(&password)?;

    let role = req.role.unwrap_or(Role::Member);
    if role == Role::Admin && !caller.as_ref().is_some_and(|c| c.user.is_admin()) {
        return Err(AppError::Forbidden(
            "Only admins can create admin accounts".to_string(),
        ));
    }

    if User::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Conflict("User already exists!".to_string()));
    }

    let password_hash = hash(password).await?;
    let user = User::create(
        &state.pool,
        CreateUserData {
            name,
            email,
            password_hash,
            role,
            business_category: optional(req.business_category),
            phone: optional(req.phone),
            chapter: optional(req.chapter).unwrap_or_else(|| state.config.default_chapter.clone()),
            membership_plan: req.membership_plan.unwrap_or(MembershipPlan::TwelveMonths),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully!", "id": user.id })),
    ))
}

/// Exchange credentials for a bearer token
async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let email = normalize_email(&required(req.email, "email")?);
    let password = req
        .password
        .ok_or_else(|| AppError::Validation("password is required".to_string()))?;

    let invalid = || AppError::Unauthorized("Invalid credentials!".to_string());

    let Some(user) = User::find_by_email(&state.pool, &email).await? else {
        // Same PBKDF2 cost as a wrong password
        verify(password, password::DUMMY_HASH.to_string()).await?;
        tracing::warn!(email = %email, "Login failed: user not found");
        return Err(invalid());
    };

    if !verify(password, user.password_hash.clone()).await? {
        tracing::warn!(user_id = %user.id, "Login failed: password mismatch");
        return Err(invalid());
    }

    let token = token::issue(
        user.id,
        &user.role,
        state.jwt_secret(),
        Duration::hours(state.config.token_ttl_hours),
        Utc::now(),
    )
    .map_err(|e| AppError::Internal(e.into()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        role: user.role,
        name: user.name,
        id: user.id,
    }))
}

/// Compact member directory
async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<MemberSummary>>> {
    let users = User::list_summaries(&state.pool).await?;
    Ok(Json(users))
}

async fn change_password(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    let (Some(current), Some(new)) = (
        req.current_password.filter(|p| !p.is_empty()),
        req.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Missing fields".to_string()));
    };

    if !verify(current, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized(
            "Incorrect current password".to_string(),
        ));
    }
    validate_password(&new)?;

    let password_hash = hash(new).await?;
    User::update_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/users", get(list_users))
        .route("/api/auth/change-password", post(change_password))
}
