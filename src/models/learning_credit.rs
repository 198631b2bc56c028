use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearningCredit {
    pub id: Uuid,
    pub member_id: Uuid,
    pub topic: String,
    pub source: String, // Podcast, Book, Training, Workshop, Other
    pub duration_hours: f64,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateLearningCreditData {
    pub member_id: Uuid,
    pub topic: String,
    pub source: String,
    pub duration_hours: f64,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearningSummary {
    pub credits: i64,
    pub total_hours: f64,
}

impl LearningCredit {
    pub async fn create(
        pool: &PgPool,
        data: CreateLearningCreditData,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO learning_credits (member_id, topic, source, duration_hours, date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.member_id)
        .bind(&data.topic)
        .bind(&data.source)
        .bind(data.duration_hours)
        .bind(data.date)
        .bind(&data.notes)
        .fetch_one(pool)
        .await
    }

    pub async fn list_for_member(pool: &PgPool, member_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM learning_credits
            WHERE member_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(pool)
        .await
    }

    pub async fn summary_for_member(
        pool: &PgPool,
        member_id: Uuid,
    ) -> Result<LearningSummary, sqlx::Error> {
        sqlx::query_as::<_, LearningSummary>(
            r#"
            SELECT COUNT(*) AS credits, COALESCE(SUM(duration_hours), 0)::float8 AS total_hours
            FROM learning_credits
            WHERE member_id = $1
            "#,
        )
        .bind(member_id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete_for_member(
        pool: &PgPool,
        id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM learning_credits WHERE id = $1 AND member_id = $2")
            .bind(id)
            .bind(member_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
