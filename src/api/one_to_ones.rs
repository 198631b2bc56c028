use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::extract::{optional, required_id, AppJson, AppPath};
use crate::api::middleware::{AppState, AuthUser};
use crate::error::{AppError, Result};
use crate::models::one_to_one::{CreateOneToOneData, OneToOne};
use crate::models::user::User;

#[derive(Debug, Deserialize)]
pub struct CreateOneToOneRequest {
    pub with_member_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub topics_discussed: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("One-to-one not found".to_string())
}

async fn create_one_to_one(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<CreateOneToOneRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let with_member_id = required_id(req.with_member_id.as_deref(), "with_member_id")?;

    if with_member_id == user.id {
        return Err(AppError::Validation(
            "Cannot log a one-to-one with yourself".to_string(),
        ));
    }

    User::find_by_id(&state.pool, with_member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    let meeting = OneToOne::create(
        &state.pool,
        CreateOneToOneData {
            member_id: user.id,
            with_member_id,
            date: req.date.unwrap_or_else(|| Utc::now().date_naive()),
            location: optional(req.location),
            topics_discussed: optional(req.topics_discussed),
        },
    )
    .await?;

    tracing::info!(
        one_to_one_id = %meeting.id,
        member_id = %user.id,
        with_member_id = %with_member_id,
        "One-to-one logged"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "One-to-one logged", "id": meeting.id })),
    ))
}

async fn list_one_to_ones(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Json<Vec<OneToOne>>> {
    let meetings = OneToOne::list_for_member(&state.pool, user.id).await?;
    Ok(Json(meetings))
}

/// The initiator or an admin may delete; others get a 404
async fn delete_one_to_one(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    OneToOne::find_by_id(&state.pool, id)
        .await?
        .filter(|m| user.is_admin() || m.member_id == user.id)
        .ok_or_else(not_found)?;

    if !OneToOne::delete(&state.pool, id).await? {
        return Err(not_found());
    }

    tracing::info!(one_to_one_id = %id, deleted_by = %user.id, "One-to-one deleted");

    Ok(Json(json!({ "message": "One-to-one deleted" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/one-to-ones",
            get(list_one_to_ones).post(create_one_to_one),
        )
        .route("/api/one-to-ones/:id", delete(delete_one_to_one))
}
