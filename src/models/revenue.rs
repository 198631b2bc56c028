use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

pub const DEFAULT_REVENUE_TYPE: &str = "Thank You For Closed Business";

/// A thank-you slip: business given by `member_id`, recorded by `created_by`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Revenue {
    pub id: Uuid,
    pub amount: f64,
    #[serde(rename = "type")]
    pub revenue_type: String,
    pub member_id: Uuid,
    pub created_by: Uuid,
    pub referral_id: Option<Uuid>,
    pub notes: Option<String>,
    pub appreciation_message: Option<String>,
    pub appreciation_reason: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateRevenueData {
    pub amount: f64,
    pub revenue_type: String,
    pub member_id: Uuid,
    pub created_by: Uuid,
    pub referral_id: Option<Uuid>,
    pub notes: Option<String>,
    pub appreciation_message: Option<String>,
    pub appreciation_reason: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct RevenueFilter {
    pub created_since: Option<DateTime<Utc>>,
    pub member_id: Option<Uuid>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Restricts rows to those where this member gave or received
    pub visible_to: Option<Uuid>,
}

impl Revenue {
    pub fn involves(&self, member_id: Uuid) -> bool {
        self.member_id == member_id || self.created_by == member_id
    }

    /// Inserts inside `tx` so the giver's notification commits with it
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateRevenueData,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO revenue (
                amount, revenue_type, member_id, created_by, referral_id,
                notes, appreciation_message, appreciation_reason, date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(data.amount)
        .bind(&data.revenue_type)
        .bind(data.member_id)
        .bind(data.created_by)
        .bind(data.referral_id)
        .bind(&data.notes)
        .bind(&data.appreciation_message)
        .bind(&data.appreciation_reason)
        .bind(data.date)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM revenue WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists revenue matching the filter, newest first
    pub async fn list(pool: &PgPool, filter: &RevenueFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT r.* FROM revenue r");

        if filter.category.is_some() {
            query.push(
                " LEFT JOIN users giver ON giver.id = r.member_id \
                 LEFT JOIN users recipient ON recipient.id = r.created_by",
            );
        }
        query.push(" WHERE TRUE");

        if let Some(since) = filter.created_since {
            query.push(" AND r.created_at >= ").push_bind(since);
        }
        if let Some(member_id) = filter.member_id {
            query
                .push(" AND (r.member_id = ")
                .push_bind(member_id)
                .push(" OR r.created_by = ")
                .push_bind(member_id)
                .push(")");
        }
        if let Some(category) = &filter.category {
            query
                .push(" AND (giver.business_category = ")
                .push_bind(category.clone())
                .push(" OR recipient.business_category = ")
                .push_bind(category.clone())
                .push(")");
        }
        if let Some(start_date) = filter.start_date {
            query.push(" AND r.date >= ").push_bind(start_date);
        }
        if let Some(end_date) = filter.end_date {
            query.push(" AND r.date <= ").push_bind(end_date);
        }
        if let Some(viewer) = filter.visible_to {
            query
                .push(" AND (r.member_id = ")
                .push_bind(viewer)
                .push(" OR r.created_by = ")
                .push_bind(viewer)
                .push(")");
        }
        query.push(" ORDER BY r.created_at DESC");

        query.build_query_as::<Self>().fetch_all(pool).await
    }

    /// Admin correction of amount and/or notes
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        amount: Option<f64>,
        notes: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE revenue
            SET
                amount = COALESCE($2, amount),
                notes = COALESCE($3, notes)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(amount)
        .bind(notes)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revenue WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sum of all amounts created since `start` (all time when `None`)
    pub async fn total_since(
        pool: &PgPool,
        start: Option<DateTime<Utc>>,
    ) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(amount), 0)::float8 FROM revenue
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
            "#,
        )
        .bind(start)
        .fetch_one(pool)
        .await
    }

    /// (date, amount) pairs for every slip
    pub async fn amounts_by_date(pool: &PgPool) -> Result<Vec<(NaiveDate, f64)>, sqlx::Error> {
        sqlx::query_as::<_, (NaiveDate, f64)>("SELECT date, amount FROM revenue ORDER BY date")
            .fetch_all(pool)
            .await
    }

    /// Revenue sums per calendar month of `created_at` since `start`
    pub async fn monthly_sums(
        pool: &PgPool,
        start: Option<DateTime<Utc>>,
    ) -> Result<Vec<(DateTime<Utc>, f64)>, sqlx::Error> {
        sqlx::query_as::<_, (DateTime<Utc>, f64)>(
            r#"
            SELECT date_trunc('month', created_at) AS month, SUM(amount)::float8 AS total
            FROM revenue
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
