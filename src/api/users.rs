use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::extract::{optional, AppJson, AppPath, AppQuery};
use crate::api::middleware::{AdminUser, AppState, AuthUser};
use crate::error::{AppError, Result};
use crate::models::user::{MembershipPlan, Role, UpdateUserData, User};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub business_category: Option<String>,
    pub business_name: Option<String>,
    pub services_offered: Option<String>,
    pub chapter: Option<String>,
    pub photo: Option<String>,
    pub membership_plan: Option<MembershipPlan>,
    pub role: Option<Role>,
}

/// Member directory with optional name search and category filter
async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppQuery(params): AppQuery<ListUsersQuery>,
) -> Result<Json<Vec<User>>> {
    let search = optional(params.search);
    let category = optional(params.category);

    let users = User::list(&state.pool, search.as_deref(), category.as_deref()).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<User>> {
    let user = User::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Members may edit their own profile; admins may edit anyone and change roles
async fn update_user(
    State(state): State<AppState>,
    AuthUser { user: caller }: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<Json<Value>> {
    if !caller.is_admin() && caller.id != id {
        return Err(AppError::Forbidden("Permission denied".to_string()));
    }

    if req.role.is_some() && !caller.is_admin() {
        tracing::warn!(user_id = %caller.id, "Ignoring role change requested by non-admin");
    }

    let name = match req.name {
        Some(name) if name.trim().is_empty() => {
            return Err(AppError::Validation("name cannot be blank".to_string()))
        }
        other => other.map(|n| n.trim().to_string()),
    };

    let data = UpdateUserData {
        name,
        phone: req.phone,
        business_category: req.business_category,
        business_name: req.business_name,
        services_offered: req.services_offered,
        chapter: req.chapter,
        photo: req.photo,
        membership_plan: req.membership_plan,
        role: req.role.filter(|_| caller.is_admin()),
    };

    let updated = User::update(&state.pool, id, data)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %updated.id, updated_by = %caller.id, "User updated");

    Ok(Json(json!({ "message": "User updated successfully" })))
}

async fn delete_user(
    State(state): State<AppState>,
    AdminUser { user: admin }: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    if !User::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, deleted_by = %admin.id, "User deleted");

    Ok(Json(json!({ "message": "User deleted successfully" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route(
            "/api/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}
