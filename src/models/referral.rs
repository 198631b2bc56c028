use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferralStatus {
    Open,
    Closed,
}

impl ReferralStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Open => "Open",
            ReferralStatus::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferralType {
    #[serde(rename = "Self")]
    OwnBusiness,
    #[default]
    Others,
}

impl ReferralType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralType::OwnBusiness => "Self",
            ReferralType::Others => "Others",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Referral {
    pub id: Uuid,
    #[serde(rename = "from_member")]
    pub from_member_id: Uuid,
    #[serde(rename = "to_member")]
    pub to_member_id: Uuid,
    pub contact_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub referral_type: String, // "Self" or "Others"
    pub heat: Option<String>,
    pub comments: Option<String>,
    pub status: String, // "Open" or "Closed"
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateReferralData {
    pub from_member_id: Uuid,
    pub to_member_id: Uuid,
    pub contact_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub referral_type: ReferralType,
    pub heat: Option<String>,
    pub comments: Option<String>,
}

impl Referral {
    /// Whether the given member sent or received this referral
    pub fn involves(&self, member_id: Uuid) -> bool {
        self.from_member_id == member_id || self.to_member_id == member_id
    }

    /// Creates a referral in the `Open` state
    /// Inserts inside `tx` so the recipient's notification commits with it
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateReferralData,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO referrals (from_member_id, to_member_id, contact_name, email, phone, referral_type, heat, comments, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'Open')
            RETURNING *
            "#,
        )
        .bind(data.from_member_id)
        .bind(data.to_member_id)
        .bind(&data.contact_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.referral_type.as_str())
        .bind(&data.heat)
        .bind(&data.comments)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM referrals WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All referrals, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM referrals
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Referrals sent or received by a member, newest first
    pub async fn list_for_member(pool: &PgPool, member_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM referrals
            WHERE from_member_id = $1 OR to_member_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(pool)
        .await
    }

    /// Updates status and/or comments; `None` when the referral is gone
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        status: Option<ReferralStatus>,
        comments: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE referrals
            SET
                status = COALESCE($2, status),
                comments = COALESCE($3, comments)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.map(|s| s.as_str()))
        .bind(comments)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM referrals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Referrals created since `start` (all time when `None`)
    pub async fn count_since(
        pool: &PgPool,
        start: Option<DateTime<Utc>>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM referrals
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
            "#,
        )
        .bind(start)
        .fetch_one(pool)
        .await
    }

    /// Referral counts per calendar month since `start`
    pub async fn monthly_counts(
        pool: &PgPool,
        start: Option<DateTime<Utc>>,
    ) -> Result<Vec<(DateTime<Utc>, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (DateTime<Utc>, i64)>(
            r#"
            SELECT date_trunc('month', created_at) AS month, COUNT(*) AS count
            FROM referrals
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(start)
        .fetch_all(pool)
        .await
    }
}
