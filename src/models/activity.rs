use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::services::engagement::ActivityCounts;

/// Per-member participation totals used for engagement scoring
#[derive(Debug, Clone, FromRow)]
pub struct MemberActivity {
    pub id: Uuid,
    pub name: String,
    pub referrals: i64,
    pub meetings: i64,
    pub events: i64,
    pub one_to_ones: i64,
}

impl MemberActivity {
    pub fn counts(&self) -> ActivityCounts {
        ActivityCounts {
            referrals: self.referrals,
            meetings: self.meetings,
            events: self.events,
            one_to_ones: self.one_to_ones,
        }
    }

    /// Activity for every user with the `member` role
    pub async fn list_members(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT
                u.id,
                u.name,
                (SELECT COUNT(*) FROM referrals r WHERE r.from_member_id = u.id) AS referrals,
                (SELECT COUNT(*) FROM meeting_attendees ma WHERE ma.user_id = u.id) AS meetings,
                (SELECT COUNT(*) FROM event_attendees ea WHERE ea.user_id = u.id) AS events,
                (SELECT COUNT(*) FROM one_to_ones o
                    WHERE o.member_id = u.id OR o.with_member_id = u.id) AS one_to_ones
            FROM users u
            WHERE u.role = 'member'
            ORDER BY u.name ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// New members per calendar month since `start`
    pub async fn monthly_signups(
        pool: &PgPool,
        start: Option<DateTime<Utc>>,
    ) -> Result<Vec<(DateTime<Utc>, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (DateTime<Utc>, i64)>(
            r#"
            SELECT date_trunc('month', created_at) AS month, COUNT(*) AS count
            FROM users
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
