use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventData {
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl Event {
    /// Create a new event
    pub async fn create(pool: &PgPool, data: CreateEventData) -> Result<Self, sqlx::Error> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, date, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(data.title)
        .bind(data.date)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    /// List all events, soonest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            ORDER BY date ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Registers a member; returns false when already registered
    pub async fn add_attendee(
        pool: &PgPool,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO event_attendees (user_id, event_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Cancels a registration; returns false when there was none
    pub async fn remove_attendee(
        pool: &PgPool,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM event_attendees
            WHERE user_id = $1 AND event_id = $2
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// (event_id, user_id) pairs for the given events
    pub async fn registrations(
        pool: &PgPool,
        event_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
        sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            SELECT event_id, user_id
            FROM event_attendees
            WHERE event_id = ANY($1)
            "#,
        )
        .bind(event_ids)
        .fetch_all(pool)
        .await
    }

    /// Registrations for events created since `start`
    pub async fn registrations_since(
        pool: &PgPool,
        start: Option<DateTime<Utc>>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM event_attendees ea
            JOIN events e ON e.id = ea.event_id
            WHERE ($1::timestamptz IS NULL OR e.created_at >= $1)
            "#,
        )
        .bind(start)
        .fetch_one(pool)
        .await
    }
}
