use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::extract::{optional, required, required_id, AppJson, AppPath};
use crate::api::middleware::{AppState, AuthUser};
use crate::api::response::{keyed, WithKey};
use crate::error::{AppError, Result};
use crate::models::notification::{CreateNotificationData, Notification, NotificationKind};
use crate::models::referral::{CreateReferralData, Referral, ReferralStatus, ReferralType};
use crate::models::user::User;
use crate::services::mailer;

#[derive(Debug, Deserialize)]
pub struct CreateReferralRequest {
    #[serde(alias = "to_member_id")]
    pub to_member: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub referral_type: Option<ReferralType>,
    pub heat: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReferralRequest {
    pub status: Option<ReferralStatus>,
    pub comments: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Referral not found".to_string())
}

/// Loads a referral the caller may see: admins see all, members their own
async fn find_visible(state: &AppState, caller: &User, id: Uuid) -> Result<Referral> {
    let referral = Referral::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;

    if caller.is_admin() || referral.involves(caller.id) {
        Ok(referral)
    } else {
        Err(not_found())
    }
}

async fn list_referrals(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Json<Vec<WithKey<Referral>>>> {
    let referrals = if user.is_admin() {
        Referral::list_all(&state.pool).await?
    } else {
        Referral::list_for_member(&state.pool, user.id).await?
    };

    Ok(Json(keyed(referrals)))
}

async fn get_referral(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<WithKey<Referral>>> {
    Ok(Json(find_visible(&state, &user, id).await?.into()))
}

/// Pass a referral to another member
async fn create_referral(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<CreateReferralRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let to_member_id = required_id(req.to_member.as_deref(), "to_member")?;
    let contact_name = required(req.contact_name, "contact_name")?;

    if to_member_id == user.id {
        return Err(AppError::Validation(
            "Cannot pass a referral to yourself".to_string(),
        ));
    }

    let recipient = User::find_by_id(&state.pool, to_member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipient member not found".to_string()))?;

    let mut tx = state.pool.begin().await?;

    let referral = Referral::create(
        &mut tx,
        CreateReferralData {
            from_member_id: user.id,
            to_member_id,
            contact_name,
            email: optional(req.email),
            phone: optional(req.phone),
            referral_type: req.referral_type.unwrap_or_default(),
            heat: optional(req.heat),
            comments: optional(req.comments),
        },
    )
    .await?;

    Notification::create_in(
        &mut tx,
        CreateNotificationData {
            user_id: recipient.id,
            kind: NotificationKind::Referral,
            message: format!(
                "New referral from {}: {}",
                user.name, referral.contact_name
            ),
            subject: Some("New Referral Received!".to_string()),
            content: referral.comments.clone(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        referral_id = %referral.id,
        from_member_id = %user.id,
        to_member_id = %recipient.id,
        "Referral created"
    );

    state.mailer.dispatch(mailer::referral_received(
        recipient.email,
        &user.name,
        &referral.contact_name,
    ));

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Referral added successfully!", "id": referral.id })),
    ))
}

async fn update_referral(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateReferralRequest>,
) -> Result<Json<Value>> {
    find_visible(&state, &user, id).await?;

    Referral::update(&state.pool, id, req.status, req.comments)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(referral_id = %id, updated_by = %user.id, "Referral updated");

    Ok(Json(json!({ "message": "Referral updated" })))
}

async fn close_referral(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    find_visible(&state, &user, id).await?;

    Referral::update(&state.pool, id, Some(ReferralStatus::Closed), None)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(referral_id = %id, closed_by = %user.id, "Referral closed");

    Ok(Json(json!({ "message": "Referral closed" })))
}

/// Only the sender or an admin may delete a referral
async fn delete_referral(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    let referral = find_visible(&state, &user, id).await?;

    if !user.is_admin() && referral.from_member_id != user.id {
        return Err(AppError::Forbidden(
            "Only the sender can delete a referral".to_string(),
        ));
    }

    if !Referral::delete(&state.pool, id).await? {
        return Err(not_found());
    }

    tracing::info!(referral_id = %id, deleted_by = %user.id, "Referral deleted");

    Ok(Json(json!({ "message": "Referral deleted" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/referrals", get(list_referrals).post(create_referral))
        .route(
            "/api/referrals/:id",
            get(get_referral)
                .put(update_referral)
                .delete(delete_referral),
        )
        .route("/api/referrals/:id/close", patch(close_referral))
}
