use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// A private meeting between two members
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OneToOne {
    pub id: Uuid,
    pub member_id: Uuid,      // initiator
    pub with_member_id: Uuid, // partner
    pub date: NaiveDate,
    pub location: Option<String>,
    pub topics_discussed: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateOneToOneData {
    pub member_id: Uuid,
    pub with_member_id: Uuid,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub topics_discussed: Option<String>,
}

impl OneToOne {
    pub async fn create(pool: &PgPool, data: CreateOneToOneData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO one_to_ones (member_id, with_member_id, date, location, topics_discussed)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.member_id)
        .bind(data.with_member_id)
        .bind(data.date)
        .bind(&data.location)
        .bind(&data.topics_discussed)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM one_to_ones WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One-to-ones where the member is either side, newest first
    pub async fn list_for_member(pool: &PgPool, member_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM one_to_ones
            WHERE member_id = $1 OR with_member_id = $1
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM one_to_ones WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
