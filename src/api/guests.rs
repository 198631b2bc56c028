use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::extract::{optional, required, AppJson, AppPath};
use crate::api::middleware::{AppState, AuthUser};
use crate::error::{AppError, Result};
use crate::models::guest::{CreateGuestData, Guest, GuestStatus};

#[derive(Debug, Deserialize)]
pub struct CreateGuestRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGuestRequest {
    pub status: Option<GuestStatus>,
    pub visit_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Guest not found".to_string())
}

/// Invite a visitor to the chapter
async fn create_guest(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<CreateGuestRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let name = required(req.name, "name")?;
    let phone = required(req.phone, "phone")?;

    let guest = Guest::create(
        &state.pool,
        CreateGuestData {
            name,
            email: optional(req.email),
            phone,
            invited_by: user.id,
            visit_date: req.visit_date,
            notes: optional(req.notes),
        },
    )
    .await?;

    tracing::info!(guest_id = %guest.id, invited_by = %user.id, "Guest invited");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Guest invited successfully", "guest_id": guest.id })),
    ))
}

async fn list_guests(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Json<Vec<Guest>>> {
    let guests = Guest::list_for_inviter(&state.pool, user.id).await?;
    Ok(Json(guests))
}

async fn get_guest(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Guest>> {
    let guest = Guest::find_for_inviter(&state.pool, id, user.id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(guest))
}

async fn update_guest(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateGuestRequest>,
) -> Result<Json<Value>> {
    Guest::update_for_inviter(&state.pool, id, user.id, req.status, req.visit_date, req.notes)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(guest_id = %id, "Guest updated");

    Ok(Json(json!({ "message": "Guest updated successfully" })))
}

async fn delete_guest(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    if !Guest::delete_for_inviter(&state.pool, id, user.id).await? {
        return Err(not_found());
    }

    tracing::info!(guest_id = %id, "Guest deleted");

    Ok(Json(json!({ "message": "Guest deleted successfully" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/guests", get(list_guests).post(create_guest))
        .route(
            "/api/guests/:id",
            get(get_guest).put(update_guest).delete(delete_guest),
        )
}
