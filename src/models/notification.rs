use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Broadcast,
    Referral,
    ThankYou,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Broadcast => "broadcast",
            NotificationKind::Referral => "referral",
            NotificationKind::ThankYou => "thank_you",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub message: String,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub read_status: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateNotificationData {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub subject: Option<String>,
    pub content: Option<String>,
}

/// "subject: first 50 chars of content", with "..." only when truncated
pub fn broadcast_preview(subject: &str, content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}: {}...", subject, head)
    } else {
        format!("{}: {}", subject, head)
    }
}

const INSERT_SQL: &str = r#"
    INSERT INTO notifications (user_id, notification_type, message, subject, content)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *
"#;

impl Notification {
    /// Notifications are always written alongside the record they announce
    pub async fn create_in(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateNotificationData,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(INSERT_SQL)
            .bind(data.user_id)
            .bind(data.kind.as_str())
            .bind(&data.message)
            .bind(&data.subject)
            .bind(&data.content)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Marks a notification read if it belongs to `user_id`
    pub async fn mark_read(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read_status = TRUE
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
