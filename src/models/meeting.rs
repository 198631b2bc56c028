use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

pub const DEFAULT_MEETING_TYPE: &str = "Chapter Meeting";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingMode {
    #[default]
    Offline,
    Online,
}

impl MeetingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingMode::Offline => "Offline",
            MeetingMode::Online => "Online",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meeting {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: String,
    pub meeting_mode: String, // "Offline" or "Online"
    pub meet_link: Option<String>,
    pub fee: f64,
    pub organized_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    #[serde(skip)]
    pub meeting_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct CreateMeetingData {
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub meeting_type: String,
    pub meeting_mode: MeetingMode,
    pub meet_link: Option<String>,
    pub fee: f64,
    pub organized_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMeetingData {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub meeting_type: Option<String>,
    pub meeting_mode: Option<MeetingMode>,
    pub meet_link: Option<String>,
    pub fee: Option<f64>,
    pub organized_by: Option<Uuid>,
}

impl Meeting {
    /// "2024-05-01T09:30" when both date and time are set
    pub fn date_time(&self) -> Option<String> {
        self.time
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("{}T{}", self.date.format("%Y-%m-%d"), t))
    }

    pub async fn create(pool: &PgPool, data: CreateMeetingData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO meetings (
                title, date, time, location, description, meeting_type,
                meeting_mode, meet_link, fee, organized_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.date)
        .bind(&data.time)
        .bind(&data.location)
        .bind(&data.description)
        .bind(&data.meeting_type)
        .bind(data.meeting_mode.as_str())
        .bind(&data.meet_link)
        .bind(data.fee)
        .bind(data.organized_by)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM meetings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All meetings, latest date first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM meetings
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateMeetingData,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE meetings
            SET
                title = COALESCE($2, title),
                date = COALESCE($3, date),
                time = COALESCE($4, time),
                location = COALESCE($5, location),
                description = COALESCE($6, description),
                meeting_type = COALESCE($7, meeting_type),
                meeting_mode = COALESCE($8, meeting_mode),
                meet_link = COALESCE($9, meet_link),
                fee = COALESCE($10, fee),
                organized_by = COALESCE($11, organized_by)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.date)
        .bind(data.time)
        .bind(data.location)
        .bind(data.description)
        .bind(data.meeting_type)
        .bind(data.meeting_mode.map(|m| m.as_str()))
        .bind(data.meet_link)
        .bind(data.fee)
        .bind(data.organized_by)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM meetings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Registers a member; returns false when already registered
    pub async fn add_attendee(
        pool: &PgPool,
        meeting_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO meeting_attendees (user_id, meeting_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(meeting_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a registration; returns false when there was none
    pub async fn remove_attendee(
        pool: &PgPool,
        meeting_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM meeting_attendees
            WHERE user_id = $1 AND meeting_id = $2
            "#,
        )
        .bind(user_id)
        .bind(meeting_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attendees of the given meetings
    pub async fn participants(
        pool: &PgPool,
        meeting_ids: &[Uuid],
    ) -> Result<Vec<Participant>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            r#"
            SELECT ma.meeting_id, u.id, u.name, u.email
            FROM meeting_attendees ma
            JOIN users u ON u.id = ma.user_id
            WHERE ma.meeting_id = ANY($1)
            ORDER BY u.name ASC
            "#,
        )
        .bind(meeting_ids)
        .fetch_all(pool)
        .await
    }

    /// Attendance records for meetings created since `start`
    pub async fn attendance_since(
        pool: &PgPool,
        start: Option<DateTime<Utc>>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM meeting_attendees ma
            JOIN meetings m ON m.id = ma.meeting_id
            WHERE ($1::timestamptz IS NULL OR m.created_at >= $1)
            "#,
        )
        .bind(start)
        .fetch_one(pool)
        .await
    }
}
