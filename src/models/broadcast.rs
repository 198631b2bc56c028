use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::user::Role;

/// Which members a broadcast reaches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientGroup {
    #[default]
    All,
    Member,
    Admin,
}

impl RecipientGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientGroup::All => "all",
            RecipientGroup::Member => "member",
            RecipientGroup::Admin => "admin",
        }
    }

    /// Role filter for recipients, `None` for everyone
    pub fn role(&self) -> Option<Role> {
        match self {
            RecipientGroup::All => None,
            RecipientGroup::Member => Some(Role::Member),
            RecipientGroup::Admin => Some(Role::Admin),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Broadcast {
    pub id: Uuid,
    pub subject: String,
    pub message: String,
    pub role: String,
    pub recipient_count: i32,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateBroadcastData {
    pub subject: String,
    pub message: String,
    pub group: RecipientGroup,
    pub recipient_count: i32,
    pub created_by: Uuid,
}

impl Broadcast {
    pub async fn create_in(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateBroadcastData,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO broadcasts (subject, message, role, recipient_count, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.subject)
        .bind(&data.message)
        .bind(data.group.as_str())
        .bind(data.recipient_count)
        .bind(data.created_by)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM broadcasts ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }
}
