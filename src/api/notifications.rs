use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::extract::{required, AppJson, AppPath};
use crate::api::middleware::{AdminUser, AppState, AuthUser};
use crate::error::{AppError, Result};
use crate::models::broadcast::{Broadcast, CreateBroadcastData, RecipientGroup};
use crate::models::notification::{
    broadcast_preview, CreateNotificationData, Notification, NotificationKind,
};
use crate::models::user::User;
use crate::services::mailer;

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub subject: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "recipientGroup", default)]
    pub recipient_group: RecipientGroup,
}

async fn list_notifications(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Json<Vec<Notification>>> {
    let notifications = Notification::list_for_user(&state.pool, user.id).await?;
    Ok(Json(notifications))
}

async fn mark_read(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    if !Notification::mark_read(&state.pool, id, user.id).await? {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(json!({ "message": "Notification marked as read" })))
}

/// Fan a message out to every member of a group.
///
/// Notifications and the broadcast record are written in one transaction;
/// the email goes out afterwards in the background.
async fn broadcast(
    State(state): State<AppState>,
    AdminUser { user: admin }: AdminUser,
    AppJson(req): AppJson<BroadcastRequest>,
) -> Result<Json<Value>> {
    let subject = required(req.subject, "subject")?;
    let content = required(req.content, "content")?;
    let group = req.recipient_group;

    let recipients = User::list_by_role(&state.pool, group.role()).await?;
    let preview = broadcast_preview(&subject, &content);

    let mut tx = state.pool.begin().await?;

    for recipient in &recipients {
        Notification::create_in(
            &mut tx,
            CreateNotificationData {
                user_id: recipient.id,
                kind: NotificationKind::Broadcast,
                message: preview.clone(),
                subject: Some(subject.clone()),
                content: Some(content.clone()),
            },
        )
        .await?;
    }

    let record = Broadcast::create_in(
        &mut tx,
        CreateBroadcastData {
            subject: subject.clone(),
            message: content.clone(),
            group,
            recipient_count: i32::try_from(recipients.len()).unwrap_or(i32::MAX),
            created_by: admin.id,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        broadcast_id = %record.id,
        group = group.as_str(),
        recipients = recipients.len(),
        sent_by = %admin.id,
        "Broadcast sent"
    );

    let count = recipients.len();
    let emails: Vec<String> = recipients.into_iter().map(|u| u.email).collect();
    if !emails.is_empty() {
        state
            .mailer
            .dispatch(mailer::broadcast(emails, &subject, &content));
    }

    Ok(Json(json!({
        "message": format!("Broadcast sent to {} members", count)
    })))
}

async fn list_broadcasts(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Broadcast>>> {
    let broadcasts = Broadcast::list(&state.pool).await?;
    Ok(Json(broadcasts))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/:id/read", put(mark_read))
        .route("/api/notifications/broadcast", post(broadcast))
        .route("/api/notifications/broadcasts", get(list_broadcasts))
}
