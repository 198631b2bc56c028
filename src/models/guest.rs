use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuestStatus {
    Invited,
    Visited,
    Joined,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl GuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuestStatus::Invited => "Invited",
            GuestStatus::Visited => "Visited",
            GuestStatus::Joined => "Joined",
            GuestStatus::FollowUp => "Follow-up",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub invited_by: Uuid,
    pub visit_date: Option<NaiveDate>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateGuestData {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub invited_by: Uuid,
    pub visit_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Guest {
    /// Records an invitation in the `Invited` state
    pub async fn create(pool: &PgPool, data: CreateGuestData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO guests (name, email, phone, invited_by, visit_date, status, notes)
            VALUES ($1, $2, $3, $4, $5, 'Invited', $6)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.invited_by)
        .bind(data.visit_date)
        .bind(&data.notes)
        .fetch_one(pool)
        .await
    }

    /// Finds a guest only if it was invited by `inviter`
    pub async fn find_for_inviter(
        pool: &PgPool,
        id: Uuid,
        inviter: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM guests WHERE id = $1 AND invited_by = $2")
            .bind(id)
            .bind(inviter)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_inviter(pool: &PgPool, inviter: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM guests
            WHERE invited_by = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(inviter)
        .fetch_all(pool)
        .await
    }

    pub async fn update_for_inviter(
        pool: &PgPool,
        id: Uuid,
        inviter: Uuid,
        status: Option<GuestStatus>,
        visit_date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE guests
            SET
                status = COALESCE($3, status),
                visit_date = COALESCE($4, visit_date),
                notes = COALESCE($5, notes)
            WHERE id = $1 AND invited_by = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(inviter)
        .bind(status.map(|s| s.as_str()))
        .bind(visit_date)
        .bind(notes)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_for_inviter(
        pool: &PgPool,
        id: Uuid,
        inviter: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM guests WHERE id = $1 AND invited_by = $2")
            .bind(id)
            .bind(inviter)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
